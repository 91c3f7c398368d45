//! Domain entities for the embedded messaging bootstrap.
//!
//! Pure types with no DOM or runtime dependencies.  The application layer in
//! `embed-bootstrap` reads them; nothing here ever touches the page.
//!
//! # What lives here?
//!
//! - Host-supplied options and the mount target (`config`)
//! - The settings captured by `init` and the configuration merge (`settings`)
//! - The trusted site origin (`origin`)
//! - The widget's display modes (`visual_state`)
//! - The iframe and stylesheet element descriptions (`frame`, `stylesheet`)

pub mod config;
pub mod frame;
pub mod origin;
pub mod settings;
pub mod stylesheet;
pub mod visual_state;

pub use config::{BootstrapOptions, MountTarget};
pub use frame::FrameBlueprint;
pub use origin::{resolve_origin, OriginError, SiteOrigin};
pub use settings::{InitRequest, Settings};
pub use stylesheet::{stylesheet_href, StylesheetError};
pub use visual_state::VisualState;
