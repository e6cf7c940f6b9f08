pub fn page_size() -> usize {
    //NOTE: using a library for this might be overkill, maybe just fix value to 4k instead (consider this later)
    page_size::get()
}
