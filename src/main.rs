fn main() -> std::process::ExitCode {
  gym_log_lib::run()
}
