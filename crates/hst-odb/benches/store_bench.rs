use criterion::{criterion_group, criterion_main, Criterion};
use hst_loose::LooseObjectStore;
use hst_object::ObjectType;
use hst_odb::{MemoryStore, ObjectStore, ObjectStoreExt};

fn bench_memory(c: &mut Criterion) {
    let store = MemoryStore::new();
    let mut i = 0u64;
    c.bench_function("memory_put", |b| {
        b.iter(|| {
            i += 1;
            store
                .write_raw(ObjectType::Blob, format!("content {i}").as_bytes())
                .unwrap();
        })
    });

    let oid = store.write_raw(ObjectType::Blob, b"read me\n").unwrap();
    c.bench_function("memory_get", |b| {
        b.iter(|| store.get(&oid, ObjectType::Blob).unwrap())
    });
}

fn bench_loose(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let store = LooseObjectStore::open(dir.path());
    let oid = ObjectStore::write_raw(&store, ObjectType::Blob, b"read me\n").unwrap();

    c.bench_function("loose_get", |b| {
        b.iter(|| store.get(&oid, ObjectType::Blob).unwrap())
    });
    c.bench_function("loose_put_existing", |b| {
        b.iter(|| ObjectStore::write_raw(&store, ObjectType::Blob, b"read me\n").unwrap())
    });
}

criterion_group!(benches, bench_memory, bench_loose);
criterion_main!(benches);
