fn main() -> anyhow::Result<()> {
  pico_mux_lib::run()
}
