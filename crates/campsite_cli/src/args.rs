use availability::{ALL_WEEKDAYS, Criteria};
use chrono::{NaiveDate, Weekday};
use clap::{Parser, ValueEnum};

/// Reservation API to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Api {
    /// recreation.gov national inventory
    #[value(name = "recreation.gov")]
    RecreationGov,

    /// ReserveCalifornia state park inventory
    #[value(name = "reservecalifornia")]
    ReserveCalifornia,
}

/// Search for campsite availability from recreation.gov or ReserveCalifornia.
#[derive(Debug, Parser)]
#[command(
    name = "find-campsites",
    version,
    after_help = "For reservecalifornia the campground argument must be a facility id. \
The id is hard to find on the website, so pass the park name instead: the tool \
prints a table of its campgrounds with their facility ids, then exits.

Examples:
  # Watch Kirby Cove and Hawk Campground for Friday or Saturday starts this month
  find-campsites -c \"Kirby Cove\" -c \"Hawk Campground\" -d Friday -d Saturday
  # Look up facility ids in Millerton Lake SRA
  find-campsites -c \"Millerton Lake SRA\" --api reservecalifornia
  # Watch a specific facility in Millerton Lake SRA
  find-campsites -c 1120 --api reservecalifornia"
)]
pub struct Args {
    /// Name of campground to search for availability (can specify multiple)
    #[arg(short, long = "campground", required = true)]
    pub campground: Vec<String>,

    /// Number of nights to stay
    #[arg(short, long, default_value_t = 1)]
    pub nights: u32,

    /// Weekday of reservation start (can specify multiple) [default: all days]
    #[arg(short = 'd', long = "day", value_parser = parse_weekday)]
    pub day: Vec<Weekday>,

    /// Number of months to search
    #[arg(short, long, default_value_t = 1)]
    pub months: u32,

    /// Reservation API to use
    #[arg(long, value_enum, default_value = "recreation.gov")]
    pub api: Api,

    /// Minutes to wait before checking again
    #[arg(long = "check-every", default_value_t = 60)]
    pub check_every: u64,

    /// Specific campsite name to ignore (can specify multiple)
    #[arg(long = "ignore")]
    pub ignore: Vec<String>,

    /// Require campsite to be the same over all nights (no switching campsites)
    #[arg(long = "require-same-site")]
    pub require_same_site: bool,

    /// Specific date to start reservation mm/dd/yyyy (can specify multiple)
    #[arg(long = "calendar-date", value_parser = parse_calendar_date)]
    pub calendar_date: Vec<NaiveDate>,

    /// Restrict results to a sub-campground (can specify multiple)
    #[arg(long = "sub-campground")]
    pub sub_campground: Vec<String>,

    /// Send SMS/email when a campsite is available
    #[arg(long)]
    pub notify: bool,

    /// Notify whenever unseen availabilities appear instead of at most
    /// once per day
    #[arg(long = "notify-per-availability", requires = "notify")]
    pub notify_per_availability: bool,
}

impl Args {
    /// Build filter criteria from the parsed flags.
    pub fn criteria(&self) -> Criteria {
        Criteria {
            weekdays: if self.day.is_empty() {
                ALL_WEEKDAYS.into_iter().collect()
            } else {
                self.day.iter().copied().collect()
            },
            nights: self.nights,
            require_same_site: self.require_same_site,
            ignore: self.ignore.iter().cloned().collect(),
            calendar_dates: self.calendar_date.iter().copied().collect(),
            sub_campgrounds: self.sub_campground.iter().cloned().collect(),
        }
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, String> {
    value
        .parse()
        .map_err(|_| format!("unknown weekday: {value}"))
}

fn parse_calendar_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%m/%d/%Y")
        .map_err(|_| format!("expected mm/dd/yyyy, got: {value}"))
}
