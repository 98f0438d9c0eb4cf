//! Request routing.
//!
//! Maps a frozen request target to exactly one handler. Paths are compared
//! as exact bytes; the query never influences which route is chosen.

use crate::http::request::RequestTarget;
use crate::http::response::Response;
use crate::routing::handlers;
use crate::tally::{TallyBus, TallyController};

/// The four behaviors the bridge offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Tally,
    Status,
    NotFound,
}

impl Route {
    pub fn resolve(path: &[u8]) -> Self {
        match path {
            b"" => Route::Index,
            b"tally" => Route::Tally,
            b"status" => Route::Status,
            _ => Route::NotFound,
        }
    }

    /// Label used in logs and metrics.
    pub fn name(self) -> &'static str {
        match self {
            Route::Index => "index",
            Route::Tally => "tally",
            Route::Status => "status",
            Route::NotFound => "not_found",
        }
    }
}

/// Dispatches requests against the tally device.
#[derive(Debug, Clone)]
pub struct Router {
    device_name: String,
}

impl Router {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
        }
    }

    pub async fn dispatch<B: TallyBus>(
        &self,
        target: &RequestTarget<'_>,
        controller: &mut TallyController<B>,
    ) -> (Route, Response) {
        let route = Route::resolve(target.path());
        let response = match route {
            Route::Index => handlers::index(),
            Route::Tally => handlers::tally(target, controller).await,
            Route::Status => handlers::status(&self.device_name, controller),
            Route::NotFound => handlers::not_found(target),
        };
        (route, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyConfig;
    use crate::http::response::Status;
    use crate::tally::{BusStats, SimulatedBus};

    #[test]
    fn resolve_is_exact() {
        assert_eq!(Route::resolve(b""), Route::Index);
        assert_eq!(Route::resolve(b"tally"), Route::Tally);
        assert_eq!(Route::resolve(b"status"), Route::Status);
        assert_eq!(Route::resolve(b"tally/"), Route::NotFound);
        assert_eq!(Route::resolve(b"Status"), Route::NotFound);
        assert_eq!(Route::resolve(b"unknown"), Route::NotFound);
    }

    #[tokio::test]
    async fn unknown_path_is_404_without_touching_the_bus() {
        let bus = SimulatedBus::new();
        let mut ctl = TallyController::new(bus.clone(), &TallyConfig::default());
        let router = Router::new("bmd-sdi-tally");

        let target = RequestTarget::new(b"unknown", b"");
        let (route, response) = router.dispatch(&target, &mut ctl).await;

        assert_eq!(route, Route::NotFound);
        assert_eq!(response.status, Status::NotFound);
        assert!(response.body.contains("unknown"));
        assert_eq!(bus.stats(), BusStats::default());
    }

    #[tokio::test]
    async fn index_page() {
        let mut ctl = TallyController::new(SimulatedBus::new(), &TallyConfig::default());
        let router = Router::new("bmd-sdi-tally");

        let (route, response) = router
            .dispatch(&RequestTarget::new(b"", b""), &mut ctl)
            .await;

        assert_eq!(route, Route::Index);
        assert_eq!(response.status, Status::Ok);
        assert!(response.body.contains("/tally?cam=[1-4]"));
    }
}
