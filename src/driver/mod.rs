//! Routes generated code to its destination: IR dumps, JIT evaluation, or a
//! whole-module artifact on disk.

pub mod driver;
