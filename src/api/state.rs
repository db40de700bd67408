use crate::pipeline::MonitorHandle;

#[derive(Clone)]
pub struct AppState {
    pub monitor: MonitorHandle,
}
