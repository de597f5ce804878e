pub mod dashboard;
pub mod renderer;
pub mod surface;

pub use dashboard::{Dashboard, SharedDashboard};
pub use renderer::Renderer;
pub use surface::{DashboardSurface, LogSurface, PlotSurface};
