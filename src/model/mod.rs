pub mod config;
pub mod genome_io;
pub mod organism;
pub mod world;

pub mod hardware {
    pub use genexpr_core::hardware::*;
}
pub mod inst_set {
    pub use genexpr_core::inst_set::*;
}
pub mod interface {
    pub use genexpr_core::interface::*;
}
pub mod programid {
    pub use genexpr_core::programid::*;
}
pub mod state {
    pub use genexpr_data::*;
}
