//! Reference programs
//!
//! Small hand-assembled programs exercising each part of the engine. Used by
//! `ivm sample`, the benchmarks and the test-suite.

use crate::bytecode::Opcode::*;
use crate::bytecode::Program;
use crate::function::FunctionMeta;

/// Names accepted by [`by_name`]
pub const NAMES: [&str; 4] = ["hello", "loop", "factorial", "call"];

/// `print 1 + 2`
pub fn hello() -> Program {
    #[rustfmt::skip]
    let code = vec![
        IConst as i32, 1,
        IConst as i32, 2,
        IAdd as i32,
        Print as i32,
        Halt as i32,
    ];
    Program::new(code, 0, vec![FunctionMeta::new("main", 0, 0, 0)])
}

/// `N = 10; I = 0; while I < N { I = I + 1 }` over globals N (0) and I (1)
pub fn counting_loop() -> Program {
    #[rustfmt::skip]
    let code = vec![
        IConst as i32, 10,      // 0
        GStore as i32, 0,       // 2
        IConst as i32, 0,       // 4
        GStore as i32, 1,       // 6
        // START (8):
        GLoad as i32, 1,        // 8
        GLoad as i32, 0,        // 10
        ILt as i32,             // 12
        Brf as i32, 24,         // 13
        GLoad as i32, 1,        // 15
        IConst as i32, 1,       // 17
        IAdd as i32,            // 19
        GStore as i32, 1,       // 20
        Br as i32, 8,           // 22
        // DONE (24):
        Halt as i32,            // 24
    ];
    Program::new(code, 2, vec![FunctionMeta::new("main", 0, 0, 0)])
}

/// Recursive `factorial(n)`, printed by `main`
///
/// `factorial` lives at 0 and `main` at 21, so the entry point is not the
/// start of code memory.
pub fn factorial(n: i32) -> Program {
    const FACTORIAL: i32 = 1;

    #[rustfmt::skip]
    let code = vec![
        // factorial: ARGS=1, LOCALS=0
        // if n < 2 return 1
        Load as i32, 0,         // 0
        IConst as i32, 2,       // 2
        ILt as i32,             // 4
        Brf as i32, 10,         // 5
        IConst as i32, 1,       // 7
        Ret as i32,             // 9
        // return n * factorial(n - 1)
        Load as i32, 0,         // 10
        Load as i32, 0,         // 12
        IConst as i32, 1,       // 14
        ISub as i32,            // 16
        Call as i32, FACTORIAL, // 17
        IMul as i32,            // 19
        Ret as i32,             // 20
        // main: print factorial(n)
        IConst as i32, n,       // 21
        Call as i32, FACTORIAL, // 23
        Print as i32,           // 25
        Halt as i32,            // 26
    ];
    Program::new(
        code,
        0,
        vec![
            FunctionMeta::new("main", 0, 0, 21),
            FunctionMeta::new("factorial", 1, 0, 0),
        ],
    )
}

/// `main() { print f(10) }` with `f(x) { a = x; return 2 * a }`
pub fn double_via_call() -> Program {
    #[rustfmt::skip]
    let code = vec![
        IConst as i32, 10,      // 0
        Call as i32, 1,         // 2
        Print as i32,           // 4
        Halt as i32,            // 5
        // f: ARGS=1, LOCALS=1
        Load as i32, 0,         // 6
        Store as i32, 1,        // 8
        Load as i32, 1,         // 10
        IConst as i32, 2,       // 12
        IMul as i32,            // 14
        Ret as i32,             // 15
    ];
    Program::new(
        code,
        2,
        vec![
            FunctionMeta::new("main", 0, 0, 0),
            FunctionMeta::new("f", 1, 1, 6),
        ],
    )
}

/// Resolve a sample by name; `arg` feeds `factorial` (default 5)
pub fn by_name(name: &str, arg: Option<i32>) -> Option<Program> {
    match name {
        "hello" => Some(hello()),
        "loop" => Some(counting_loop()),
        "factorial" => Some(factorial(arg.unwrap_or(5))),
        "call" => Some(double_via_call()),
        _ => None,
    }
}
