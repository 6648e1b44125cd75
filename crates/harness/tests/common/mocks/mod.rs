/// Reference interpreter mocks.
pub mod interpreter;
