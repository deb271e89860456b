//! Modal (characteristic) transformation of the four-equation FSI water-hammer model.
//!
//! The coupled fluid/pipe-wall system `A q_t + B q_x = 0` with
//! `q = (V, P, u_dot, sigma)` is diagonalized in closed form: the squared wave
//! speeds are the roots of a quadratic and the left eigenvectors follow
//! algebraically from the characteristic equation. The basis is derived once on
//! the coordinator and shipped read-only to every worker inside [`ModelSetup`].

pub mod basis;
pub mod error;
pub mod grid;
pub mod initial;
pub mod params;
pub mod setup;
pub mod speeds;

pub use basis::{ModalBasis, ModalModel, left_eigenvectors, system_operators};
pub use error::{ModalError, ModalResult};
pub use grid::TimeGrid;
pub use initial::InitialCondition;
pub use params::{ModelParameters, PhysicalConstants};
pub use setup::ModelSetup;
pub use speeds::WaveSpeeds;

/// Number of physical (and modal) state variables.
pub const STATE_DIM: usize = 4;

/// Column labels for physical state vectors, in storage order.
pub const PHYSICAL_LABELS: [&str; STATE_DIM] =
    ["V_fluid", "Pressure", "Strain_rate", "Hoop_stress"];
