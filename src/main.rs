fn main() -> std::io::Result<()> {
    tabopen::run()
}
