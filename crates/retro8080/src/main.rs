use retro8080::{CliArgs, CpmMachine, Mode, RunConfig, USAGE};
use retro8080_cpu::TraceIo;

fn main() {
    env_logger::init();

    let args = match retro8080::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}.\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&args) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> anyhow::Result<()> {
    let image = retro8080::load_image(&args.path)?;
    let trace = log::log_enabled!(log::Level::Trace);

    match args.mode {
        Mode::Disassemble => {
            for line in retro8080::disassemble_image(&image, args.offset) {
                println!("{}", line);
            }
        }
        Mode::Run | Mode::Check => {
            let config = RunConfig::builder()
                .load_offset(args.offset)
                .max_steps(args.max_steps)
                .cross_check(args.mode == Mode::Check)
                .trace(trace)
                .build();
            let summary = retro8080::run(&config, &image, &mut TraceIo::new())?;
            println!("{}", summary.cpu);
        }
        Mode::Cpm => {
            if args.offset != 0 {
                log::warn!("--offset ignored; CP/M programs load at $0100");
            }
            let mut machine = CpmMachine::new();
            let mut config = CpmMachine::config(args.max_steps, false);
            config.trace = trace;
            let summary = retro8080::run(&config, &image, &mut machine)?;
            println!("{}", machine.console());
            log::info!("{} steps, {:?}", summary.steps, summary.stop);
        }
    }
    Ok(())
}
