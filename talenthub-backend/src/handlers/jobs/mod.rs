pub mod enqueue;
