fn main() {
    // The cuBLAS binding in `drivers::cuda` needs the native library only when the CUDA target is
    // compiled in.
    if std::env::var_os("CARGO_FEATURE_CUDA").is_some() {
        println!("cargo:rustc-link-lib=dylib=cublas");
    }
}
