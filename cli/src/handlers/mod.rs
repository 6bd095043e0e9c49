mod compare;
mod regress;

pub use compare::handle_compare;
pub use regress::handle_regress;
