//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the session model, form validation, and the gate
//! controller so route handlers can stay focused on request extraction and
//! response assembly.

pub mod forms;
pub mod gate;
pub mod session;
