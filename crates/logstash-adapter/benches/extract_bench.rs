use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logstash_adapter::container::ContainerIdentity;
use logstash_adapter::metadata::extract;
use logstash_adapter::record::{compose, encode};

fn environment(extra: usize) -> Vec<String> {
    let mut env = vec![
        "LOGSTASH_TAGS=prod,web,eu-west-1".to_string(),
        "MARATHON_APP_ID=/notifier".to_string(),
        "MARATHON_APP_VERSION=2016-10-20T13:25:13.627Z".to_string(),
        "MARATHON_APP_RESOURCE_CPUS=0.01".to_string(),
        "MARATHON_APP_RESOURCE_MEM=128.0".to_string(),
        "MARATHON_APP_LABEL_ENVIRONMENT=prod".to_string(),
    ];
    env.extend((0..extra).map(|i| format!("APP_SETTING_{i}=value{i}")));
    env
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    for extra in [0, 16, 128] {
        let env = environment(extra);
        group.bench_with_input(BenchmarkId::from_parameter(env.len()), &env, |b, env| {
            b.iter(|| extract(black_box(env)));
        });
    }
    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let metadata = extract(&environment(0));
    let docker = ContainerIdentity {
        name: "/web".to_string(),
        id: "4fb9b4eccdd4884".to_string(),
        image: "nginx:1.25".to_string(),
        hostname: "web-1".to_string(),
    };

    let mut group = c.benchmark_group("compose");
    for (name, data) in [
        ("plain", "GET /health 200 0.3ms"),
        ("json", r#"{"level":"info","msg":"request served","status":200,"path":"/health"}"#),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, &data| {
            b.iter(|| {
                let record = compose(
                    black_box(data),
                    "stdout",
                    &docker,
                    &metadata.tags,
                    &metadata.scheduler,
                )
                .unwrap();
                encode(&record).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract, bench_compose);
criterion_main!(benches);
