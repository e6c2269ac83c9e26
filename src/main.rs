use playground_chargers::filter::parse;
use playground_chargers::session::DEFAULT_LOCATE_MAX_ZOOM;
use playground_chargers::{
    Bounds, Client, Config, Location, Output, SearchOutcome, Session, StaticLocator, Viewport,
};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::{error, info, warn, Level};

#[derive(Debug, Clone, Copy)]
enum Format {
    GeoJson,
    JsonLines,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geojson" => Ok(Format::GeoJson),
            "jsonl" => Ok(Format::JsonLines),
            _ => Err(format!("unknown format {:?}, use geojson or jsonl", s)),
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "playground_chargers")]
/// Find EV charging stations with a playground nearby.
struct Opt {
    /// Search region as south,west,north,east. Derived from the viewport if omitted
    #[structopt(long)]
    bbox: Option<Bounds>,

    /// Viewport center as lat,lon
    #[structopt(long, default_value = "52.52,13.405")]
    center: Location,

    #[structopt(long, default_value = "13")]
    zoom: u8,

    /// Viewport width in pixels
    #[structopt(long, default_value = "1024")]
    width: u32,

    /// Viewport height in pixels
    #[structopt(long, default_value = "768")]
    height: u32,

    /// The user's position as lat,lon, implies --locate
    #[structopt(long)]
    location: Option<Location>,

    /// Center the view on the --location position before searching
    #[structopt(long, requires = "location")]
    locate: bool,

    /// Retry once if the position cannot be determined. Has no effect with
    /// --location, whose position is always found
    #[structopt(long)]
    retry_locate: bool,

    /// Maximum distance between charger and playground in meters
    #[structopt(short, long, default_value = "100")]
    radius: f64,

    /// Server side query timeout in seconds
    #[structopt(long, default_value = "25")]
    timeout: u32,

    /// Overpass interpreter endpoint
    #[structopt(
        long,
        env = "OVERPASS_URL",
        default_value = "https://overpass-api.de/api/interpreter"
    )]
    url: String,

    /// Selector for chargers, e.g. "amenity~charging_station"
    #[structopt(long, default_value = "amenity~charging_station")]
    chargers: String,

    /// Selector for playgrounds, e.g. "leisure~playground"
    #[structopt(long, default_value = "leisure~playground")]
    playgrounds: String,

    /// Output format: geojson or jsonl
    #[structopt(short, long, default_value = "geojson")]
    format: Format,

    /// Write markers to this file instead of stdout
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Read commands from stdin, an empty line triggers a search
    #[structopt(short, long)]
    interactive: bool,

    #[structopt(short, long)]
    verbose: bool,
}

impl Opt {
    fn config(&self) -> playground_chargers::Result<Config> {
        let config = Config {
            url: self.url.clone(),
            radius: self.radius,
            timeout: self.timeout,
            chargers: parse(&self.chargers),
            playgrounds: parse(&self.playgrounds),
            retry_locate: self.retry_locate,
            locate_max_zoom: DEFAULT_LOCATE_MAX_ZOOM,
        };
        config.validate()?;
        Ok(config)
    }
}

fn write_markers(session: &Session<Client>, opt: &Opt) -> Result<(), Box<dyn Error>> {
    let mut writer: Box<dyn Write> = match &opt.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    let markers = session.markers();
    match opt.format {
        Format::GeoJson => markers.write_geojson(&mut writer)?,
        Format::JsonLines => markers.write_json_lines(&mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn search_and_write(session: &mut Session<Client>, opt: &Opt) -> Result<(), Box<dyn Error>> {
    if let SearchOutcome::Rendered { pairs, markers, .. } = session.search()? {
        info!(pairs, markers, "writing markers");
        write_markers(session, opt)?;
    }
    Ok(())
}

enum Command {
    Find,
    Bbox(Bounds),
    Center(Location),
    Quit,
}

fn parse_command(line: &str) -> Result<Command, Box<dyn Error>> {
    let mut parts = line.trim().splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let argument = parts.next().unwrap_or_default();
    match command {
        "" | "find" => Ok(Command::Find),
        "bbox" => Ok(Command::Bbox(argument.parse()?)),
        "center" => Ok(Command::Center(argument.parse()?)),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(format!("unknown command {:?}", command).into()),
    }
}

fn interact(session: &mut Session<Client>, opt: &Opt) -> Result<(), Box<dyn Error>> {
    eprintln!("enter: search, bbox s,w,n,e | center lat,lon: move, quit: exit");
    for line in io::stdin().lock().lines() {
        let command = match parse_command(&line?) {
            Ok(command) => command,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        match command {
            Command::Find => {
                // failures are reported, the next search is up to the user
                if let Err(e) = search_and_write(session, opt) {
                    error!("search failed: {}", e);
                }
            }
            Command::Bbox(bounds) => session.pin_bounds(bounds),
            Command::Center(center) => session.set_center(center),
            Command::Quit => break,
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::from_args();

    let level = if opt.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = opt.config()?;
    let client = Client::new(&config.url)?;
    let viewport = Viewport::new(opt.center, opt.zoom, opt.width, opt.height);
    let mut session = Session::new(config, client, viewport);

    // --locate requires --location, so the static locator always has a position
    if opt.locate || opt.location.is_some() {
        let locator = StaticLocator(opt.location);
        if let Err(e) = session.locate(&locator) {
            eprintln!("Your position could not be determined: {}", e);
        }
    }
    if let Some(bounds) = opt.bbox {
        session.pin_bounds(bounds);
    }

    if opt.interactive {
        interact(&mut session, &opt)
    } else {
        search_and_write(&mut session, &opt)
    }
}
