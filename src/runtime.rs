//! Builtins callable from generated code.
//!
//! JIT-evaluated code reaches these through global mappings. Linked
//! executables get the same functions from `runtime/lib.c`.

use std::io::{self, Write};

/// C source of the builtins, compiled into every linked executable.
pub const RUNTIME_SOURCE: &str = include_str!("../runtime/lib.c");

/// Writes the byte `x` to stdout and returns 0.
#[no_mangle]
pub extern "C" fn putchard(x: f64) -> f64 {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(&[x as u8]);
    let _ = stdout.flush();

    0.0
}

/// Prints `x` with six decimals on its own line and returns 0.
#[no_mangle]
pub extern "C" fn printd(x: f64) -> f64 {
    println!("{:.6}", x);

    0.0
}

/// Name and address of every builtin.
pub fn builtins() -> [(&'static str, usize); 2] {
    [
        ("putchard", putchard as extern "C" fn(f64) -> f64 as usize),
        ("printd", printd as extern "C" fn(f64) -> f64 as usize),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_return_zero() {
        assert_eq!(printd(1.5), 0.0);
        assert_eq!(putchard(10.0), 0.0);
    }

    #[test]
    fn test_builtin_table() {
        let names: Vec<&str> = builtins().iter().map(|(name, _)| *name).collect();

        assert_eq!(names, ["putchard", "printd"]);
        assert!(builtins().iter().all(|(_, address)| *address != 0));
        assert!(RUNTIME_SOURCE.contains("putchard"));
    }
}
