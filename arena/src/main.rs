fn main() {
    arena::app::bootstrap::run_client_app();
}
