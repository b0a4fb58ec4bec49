use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use log::{debug, error, info, warn};

use crate::classifier::Classifier;
use crate::error::PredictError;
use crate::models::{FormFields, LoanApplication, Outcome};
use crate::template::render_index;

/// Shared, read-only state handed to every worker.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the model failed to load at start-up.
    pub model: Option<Arc<dyn Classifier>>,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn Classifier>>) -> Self {
        Self { model }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/predict").route(web::post().to(predict)));
}

pub async fn index() -> HttpResponse {
    page(None)
}

pub async fn predict(state: web::Data<AppState>, form: web::Form<FormFields>) -> HttpResponse {
    info!("🔄 Prediction request received");
    let form = form.into_inner();
    for (key, value) in form.iter() {
        debug!("  {}: {}", key, value);
    }

    let outcome = evaluate(state.model.clone(), &form).await;
    if let Some(confidence) = outcome.confidence() {
        debug!("📈 Confidence: {:.1}%", confidence);
    }
    match &outcome {
        Outcome::Approved { .. } | Outcome::Rejected { .. } => {
            info!("✅ Final result: {}", outcome.message())
        }
        _ => error!("🔴 {}", outcome.message()),
    }
    page(Some(&outcome.message()))
}

/// Runs the whole pipeline for one submission. Every failure becomes an outcome.
async fn evaluate(model: Option<Arc<dyn Classifier>>, form: &FormFields) -> Outcome {
    let application = match LoanApplication::from_form(form) {
        Ok(application) => application,
        Err(e) => return Outcome::InvalidInput(e),
    };

    let model = match model {
        Some(model) => model,
        None => return Outcome::ModelUnavailable,
    };

    debug!("📊 Input data created: {}", application);

    // Inference is CPU bound; keep it off the async workers.
    match web::block(move || classify(model.as_ref(), &application)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => Outcome::ProcessingError(e.to_string()),
        Err(e) => Outcome::ProcessingError(e.to_string()),
    }
}

fn classify(
    model: &dyn Classifier,
    application: &LoanApplication,
) -> Result<Outcome, PredictError> {
    let label = model.predict(application)?;
    debug!("🔮 Raw prediction: {}", label);

    let confidence = match model.predict_proba(application) {
        Ok(probabilities) => {
            Some(probabilities.iter().copied().fold(f32::MIN, f32::max) * 100.0)
        }
        Err(e) => {
            warn!("⚠️ Could not get probability: {}", e);
            None
        }
    };

    Ok(Outcome::from_label(&label, confidence))
}

fn page(prediction: Option<&str>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render_index(prediction))
}
