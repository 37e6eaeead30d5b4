pub mod automation;
pub mod dates;
pub mod events;
pub mod macros;
pub mod people;
pub mod recruitment;

pub use automation::*;
pub use dates::*;
pub use events::*;
pub use people::*;
pub use recruitment::*;
