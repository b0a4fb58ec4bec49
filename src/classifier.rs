use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use tract_onnx::prelude::*;
use tract_onnx::tract_hir::infer::Factoid;

use crate::error::{ModelError, PredictError};
use crate::models::{ClassLabel, FeatureValue, LoanApplication, COLUMNS};

/// A trained loan classifier.
///
/// Implementations are loaded once and shared read-only between workers.
pub trait Classifier: Send + Sync {
    fn predict(&self, application: &LoanApplication) -> Result<ClassLabel, PredictError>;

    /// Probability of each class, in the model's class order.
    fn predict_proba(&self, _application: &LoanApplication) -> Result<Vec<f32>, PredictError> {
        Err(PredictError::Unsupported)
    }
}

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX graph taking one `[1, 1]` input per loan application column.
///
/// Output 0 holds the predicted label, output 1 (when present) the class
/// probabilities.
pub struct OnnxClassifier {
    model: Plan,
    // (column, element type) for each graph input, in graph order.
    inputs: Vec<(&'static str, DatumType)>,
    has_probabilities: bool,
}

impl OnnxClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, ModelError> {
        let model_path = model_path.as_ref();
        if !model_path.is_file() {
            return Err(ModelError::Missing(model_path.to_path_buf()));
        }

        let mut model = tract_onnx::onnx().model_for_path(model_path)?;

        let mut inputs = Vec::with_capacity(COLUMNS.len());
        for (ix, outlet) in model.input_outlets()?.to_vec().into_iter().enumerate() {
            let name = model.node(outlet.node).name.clone();
            let column = COLUMNS
                .iter()
                .copied()
                .find(|c| *c == name)
                .ok_or_else(|| ModelError::UnknownInput(name.clone()))?;
            let dt = model
                .input_fact(ix)?
                .datum_type
                .concretize()
                .ok_or(ModelError::UntypedInput(name))?;
            model.set_input_fact(ix, InferenceFact::dt_shape(dt, tvec!(1, 1)))?;
            inputs.push((column, dt));
        }
        if let Some(missing) = COLUMNS.iter().find(|c| !inputs.iter().any(|(i, _)| i == *c)) {
            return Err(ModelError::MissingColumn(*missing));
        }

        let has_probabilities = model.output_outlets()?.len() > 1;
        let model = model.into_optimized()?.into_runnable()?;

        Ok(Self {
            model,
            inputs,
            has_probabilities,
        })
    }

    fn run(&self, application: &LoanApplication) -> Result<TVec<TValue>, PredictError> {
        let mut tensors: TVec<TValue> = TVec::new();
        for (column, dt) in &self.inputs {
            let value = application
                .value(column)
                .ok_or(PredictError::MissingInput(*column))?;
            tensors.push(column_tensor(&value, *dt)?.into());
        }
        Ok(self.model.run(tensors)?)
    }
}

fn column_tensor(value: &FeatureValue<'_>, dt: DatumType) -> TractResult<Tensor> {
    let tensor = match value {
        FeatureValue::Int(v) => ndarray::arr2(&[[*v]]).into_tensor(),
        FeatureValue::Float(v) => ndarray::arr2(&[[*v]]).into_tensor(),
        FeatureValue::Text(v) => return Ok(ndarray::arr2(&[[v.to_string()]]).into_tensor()),
    };
    Ok(tensor.cast_to_dt(dt)?.into_owned())
}

impl Classifier for OnnxClassifier {
    fn predict(&self, application: &LoanApplication) -> Result<ClassLabel, PredictError> {
        let outputs = self.run(application)?;
        let labels = outputs
            .first()
            .ok_or(PredictError::EmptyOutput("label"))?;

        if labels.datum_type() == String::datum_type() {
            let label = labels
                .to_array_view::<String>()?
                .iter()
                .next()
                .cloned()
                .ok_or(PredictError::EmptyOutput("label"))?;
            return Ok(ClassLabel::Text(label));
        }

        let labels = labels.cast_to::<f64>()?;
        let label = labels
            .to_array_view::<f64>()?
            .iter()
            .next()
            .copied()
            .ok_or(PredictError::EmptyOutput("label"))?;
        Ok(ClassLabel::Numeric(label))
    }

    fn predict_proba(&self, application: &LoanApplication) -> Result<Vec<f32>, PredictError> {
        if !self.has_probabilities {
            return Err(PredictError::Unsupported);
        }
        let outputs = self.run(application)?;
        let probabilities = outputs
            .get(1)
            .ok_or(PredictError::EmptyOutput("probabilities"))?
            .cast_to::<f32>()?;
        let row: Vec<f32> = probabilities.to_array_view::<f32>()?.iter().copied().collect();
        if row.is_empty() {
            return Err(PredictError::EmptyOutput("probabilities"));
        }
        Ok(row)
    }
}

/// Loads the model once at start-up.
///
/// Any failure is logged and yields `None`: the server still serves the form,
/// and every prediction reports the model as unavailable.
pub fn load_model<P: AsRef<Path>>(model_path: P) -> Option<Arc<dyn Classifier>> {
    let model_path = model_path.as_ref();
    match OnnxClassifier::load(model_path) {
        Ok(model) => {
            info!("✅ Model loaded successfully from {}", model_path.display());
            Some(Arc::new(model))
        }
        Err(e) => {
            error!("❌ Error loading model from {}: {}", model_path.display(), e);
            None
        }
    }
}
