pub mod form;
pub mod predict;
pub mod system;

pub use form::*;
pub use predict::*;
pub use system::*;

use axum::http::StatusCode;

use crate::error::PredictorError;

/// Map a service error onto the `(StatusCode, String)` rejection used by JSON handlers
pub(crate) fn reject(err: PredictorError) -> (StatusCode, String) {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string())
}

#[cfg(test)]
pub(crate) mod fixture {
    use crate::api::AppState;
    use crate::config::UiConfig;
    use crate::data::read_dataset;
    use crate::domain::Schema;
    use crate::ml::BoosterParams;
    use crate::services::PriceService;

    const CSV: &str = "\
suburb,rooms,type,price,bathroom,car,landsize,buildingarea,yearbuilt,councilarea,regionname,building_age
Abbotsford,2,h,1480000,1,1,202,,,Yarra,Northern Metropolitan,
Abbotsford,3,h,1035000,2,0,156,79,1900,Yarra,Northern Metropolitan,125
Kew,4,u,2100000,2,2,0,150,2005,Boroondara,Southern Metropolitan,20
Kew,3,h,1600000,1,2,450,120,1960,Boroondara,Southern Metropolitan,65
";

    pub fn state() -> AppState {
        let ds = read_dataset(CSV.as_bytes(), &Schema::housing()).unwrap();
        let params = BoosterParams {
            n_estimators: 10,
            ..Default::default()
        };
        let service = PriceService::from_dataset(&ds, &params, "AUD").unwrap();
        AppState::new(service, UiConfig::default())
    }
}
