// Application layer: HTTP surface and service lifecycle.

pub mod registrar;
pub mod router;
pub mod state;
