use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use wpool::{CancelToken, Pid, Process, Result, WorkerPool};

struct NoopProcess {
    pid: Pid,
}

impl Process for NoopProcess {
    fn name(&self) -> String {
        self.pid.to_string()
    }

    fn pid(&self) -> Pid {
        self.pid.clone()
    }

    fn start(&self, _token: &CancelToken) -> Result<()> {
        Ok(())
    }
}

// register a batch of trivial processes and drain it through the pool
pub fn drain_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_bench");
    for size in [1usize, 2, 4].iter() {
        group.bench_with_input(BenchmarkId::new("workers", size), size, |b, &size| {
            b.iter(|| {
                let pool = WorkerPool::new(size).unwrap();
                let processes = (0..100)
                    .map(|i| {
                        Arc::new(NoopProcess {
                            pid: Pid::from(format!("p-{}", i)),
                        }) as Arc<dyn Process>
                    })
                    .collect();
                pool.register(processes).unwrap();
                pool.start().unwrap();
                pool.close().unwrap();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, drain_bench);
criterion_main!(benches);
