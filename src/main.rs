use extendible_hash_index::buffer_pool::BufferPool;
use extendible_hash_index::ExtendibleHashIndex;

fn main() {
    env_logger::init();

    let mut index: ExtendibleHashIndex<i64, &str> = ExtendibleHashIndex::new(2);
    for key in 1..=9i64 {
        index.insert(key, "v");
    }
    println!(
        "index: global_depth={} num_buckets={} distinct_buckets={}",
        index.global_depth(),
        index.num_buckets(),
        index.distinct_bucket_count()
    );

    let mut pool = BufferPool::new(4, 16);
    pool.insert("database/0/0.sst", 0, b"hello world");
    println!("buffer pool page 0: {:?}", pool.get("database/0/0.sst", 0));
}
