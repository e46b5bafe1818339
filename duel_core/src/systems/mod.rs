pub mod collision;
pub mod combat;
pub mod input;
pub mod movement;
pub mod pickups;
pub mod turrets;

pub use collision::*;
pub use combat::*;
pub use input::*;
pub use movement::*;
pub use pickups::*;
pub use turrets::*;
