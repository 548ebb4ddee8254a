fn main() -> std::io::Result<()> {
    regiontales_lib::run()
}
