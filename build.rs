fn main() {
    // Host builds (tests, `--no-default-features`) have no ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
