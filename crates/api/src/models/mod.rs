pub mod declaration;
pub mod descriptor;
pub mod registry;

pub use declaration::*;
pub use descriptor::*;
pub use registry::*;
