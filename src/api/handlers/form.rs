use axum::{extract::State, response::Html, Form};
use tracing::warn;

use crate::api::{
    state::AppState,
    view::{render_page, Outcome},
};
use crate::domain::RawListing;

/// GET / -- empty form with slider defaults
pub async fn show_form(State(state): State<AppState>) -> Html<String> {
    Html(render_page(
        &state.ui,
        state.service.options(),
        &RawListing::default(),
        None,
    ))
}

/// POST / -- price the submitted form and re-render it with the estimate
pub async fn submit_form(
    State(state): State<AppState>,
    Form(listing): Form<RawListing>,
) -> Html<String> {
    let outcome = match state.service.estimate(&listing) {
        Ok(estimate) => Outcome::Estimate(estimate.formatted),
        Err(e) => {
            warn!(error = %e, "form prediction failed");
            Outcome::Error(format!("Could not estimate a price: {e}"))
        }
    };
    Html(render_page(
        &state.ui,
        state.service.options(),
        &listing,
        Some(&outcome),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::fixture;

    #[test]
    fn form_lists_training_suburbs() {
        let Html(page) = tokio_test::block_on(show_form(State(fixture::state())));
        assert!(page.contains("<option value=\"Abbotsford\">Abbotsford</option>"));
        assert!(page.contains("<option value=\"Kew\">Kew</option>"));
        assert!(!page.contains("Estimated Price"));
    }

    #[test]
    fn submit_shows_estimate_and_keeps_selection() {
        let listing = RawListing {
            rooms: Some("3".to_string()),
            suburb: Some("Kew".to_string()),
            ..Default::default()
        };
        let Html(page) = tokio_test::block_on(submit_form(
            State(fixture::state()),
            Form(listing),
        ));
        assert!(page.contains("Estimated Price: $"));
        assert!(page.contains(" AUD</h2>"));
        assert!(page.contains("<option value=\"Kew\" selected>"));
    }
}
