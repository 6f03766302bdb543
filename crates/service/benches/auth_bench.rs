use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::time::Duration;

use service::auth::domain::App;
use service::auth::password::PasswordHashing;
use service::auth::repository::mock::MockCredentialStore;
use service::auth::service::{AuthConfig, AuthService};

fn bench_login(c: &mut Criterion) {
    let app = App { id: 1, name: "bench".into(), secret: "bench-secret".into() };
    let repo = Arc::new(MockCredentialStore::with_app(app));
    // production cost parameters: the benchmark shows the real per-login price
    let svc = AuthService::new(repo, AuthConfig { token_ttl: Duration::from_secs(3600), hashing: PasswordHashing::default() });

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(svc.register_new_user("bench@example.com", "Benchmark1")).unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login("bench@example.com", "Benchmark1", 1)).unwrap();
        });
    });

    c.bench_function("auth_login_unknown_email", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login("ghost@example.com", "Benchmark1", 1)).unwrap_err();
        });
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
