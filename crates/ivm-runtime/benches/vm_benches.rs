//! VM Performance Benchmarks
//!
//! - Recursive calls (factorial)
//! - Global-memory loop
//! - Decode-heavy straight-line arithmetic
//!
//! Run with: cargo bench --bench vm_benches

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ivm_runtime::bytecode::Opcode;
use ivm_runtime::{samples, FunctionMeta, Program, SharedBuffer, VmConfig, VM};

fn vm_run(program: Program, config: &VmConfig) {
    let start = program.entry_address().unwrap_or(0);
    let mut vm = VM::with_config(program, config);
    vm.set_output_writer(SharedBuffer::new().writer());
    let _ = vm.run(start);
}

fn bench_factorial(c: &mut Criterion) {
    let config = VmConfig {
        stack_size: 4096,
        max_call_depth: 4096,
        trace: false,
    };
    let mut group = c.benchmark_group("vm_factorial");
    for n in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| vm_run(samples::factorial(black_box(n)), &config));
        });
    }
    group.finish();
}

fn bench_counting_loop(c: &mut Criterion) {
    let config = VmConfig::default();
    c.bench_function("vm_counting_loop_10", |b| {
        b.iter(|| vm_run(black_box(samples::counting_loop()), &config));
    });
}

fn bench_arithmetic(c: &mut Criterion) {
    let mut program = Program::new(Vec::new(), 0, vec![FunctionMeta::new("main", 0, 0, 0)]);
    program.emit_with(Opcode::IConst, 0);
    for i in 0..1000 {
        program.emit_with(Opcode::IConst, i);
        program.emit(Opcode::IAdd);
    }
    program.emit(Opcode::Halt);

    let config = VmConfig::default();
    c.bench_function("vm_arithmetic_add_1000", |b| {
        b.iter(|| vm_run(black_box(program.clone()), &config));
    });
}

criterion_group!(benches, bench_factorial, bench_counting_loop, bench_arithmetic);
criterion_main!(benches);
