//! Onboarding wizard: controller, typed step forms, and a terminal front end.

pub mod context;
pub mod controller;
pub mod steps;
pub mod terminal;

pub use context::{Notifier, Toast, ToastLevel, WizardContext};
pub use controller::WizardController;
pub use steps::StepForms;
pub use terminal::run_terminal;
