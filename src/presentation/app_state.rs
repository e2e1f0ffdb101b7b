// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::sensor_service::SensorService;
use crate::application::session::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: DashboardService,
    pub sensors: SensorService,
    pub auth: AuthService,
}
