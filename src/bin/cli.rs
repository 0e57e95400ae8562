//! prefkv CLI
//!
//! Inspect and edit a preference snapshot file.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use crossbeam::channel::RecvTimeoutError;
use tracing_subscriber::{fmt, EnvFilter};

use prefkv::codec::{self, EncodedValue, PrefCodec};
use prefkv::store::{file, Edit};
use prefkv::{Config, FileStore, FlatStore, PrefError, Result, TransactionalStore, TxStore};

/// prefkv CLI
#[derive(Parser, Debug)]
#[command(name = "prefkv")]
#[command(about = "Inspect and edit prefkv preference stores")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./prefkv_data")]
    data_dir: String,

    /// Store name (snapshot file stem)
    #[arg(short, long, default_value = "prefs")]
    store: String,

    /// Store kind used to open the snapshot
    #[arg(short, long, value_enum, default_value_t = StoreKind::Flat)]
    kind: StoreKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Flat,
    Tx,
}

/// Domain types a value can be parsed as / decoded to
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ValueType {
    String,
    Int,
    Long,
    Double,
    Bool,
    Date,
    LocalDate,
    LocalTime,
    LocalDateTime,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the value stored under a key
    Get {
        /// The key to read
        key: String,

        /// Decode as this domain type instead of printing the raw value
        #[arg(long = "as", value_enum)]
        as_type: Option<ValueType>,
    },

    /// Store a value
    Set {
        /// The key to set
        key: String,

        /// The value, in the domain type's text form
        value: String,

        /// Domain type of the value
        #[arg(short = 't', long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,
    },

    /// Remove a key
    Del {
        /// The key to remove
        key: String,
    },

    /// List every key with its stored type and value
    List,

    /// Remove every key
    Clear,

    /// Print a key's value, then each change to it (tx stores only)
    Watch {
        /// The key to watch
        key: String,

        /// Decode as this domain type instead of printing the raw value
        #[arg(long = "as", value_enum)]
        as_type: Option<ValueType>,

        /// How often to re-read the snapshot file
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,prefkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .store_name(&args.store)
        .build();

    let store = Store::open(args.kind, &config)?;

    match args.command {
        Commands::Get { key, as_type } => show(&key, store.get(&key).as_ref(), as_type),
        Commands::Set {
            key,
            value,
            value_type,
        } => {
            let encoded = parse(&value, value_type)?;
            store.write(Edit::new().put(key, encoded))?;
        }
        Commands::Del { key } => store.write(Edit::new().remove(key))?,
        Commands::List => {
            for (key, value) in store.entries() {
                println!("{}\t{}\t{}", key, value.type_name(), value);
            }
        }
        Commands::Clear => store.write(Edit::new().clear())?,
        Commands::Watch {
            key,
            as_type,
            interval_ms,
        } => {
            let Store::Tx(store) = store else {
                return Err(PrefError::Config("watch needs --kind tx".into()));
            };
            watch(&store, &key, as_type, Duration::from_millis(interval_ms))?;
        }
    }

    Ok(())
}

/// Follow `key` in the store's snapshot file until interrupted
///
/// The file is re-read every `interval` so writes from other processes show
/// up; in-process transactions arrive through the store subscription.
fn watch(store: &TxStore, key: &str, as_type: Option<ValueType>, interval: Duration) -> Result<()> {
    let updates = store.subscribe();
    let mut last: Option<Option<EncodedValue>> = None;

    loop {
        let raw = match updates.recv_timeout(interval) {
            Ok(snapshot) => snapshot.get(key).cloned(),
            Err(RecvTimeoutError::Timeout) => file::read_snapshot(store.path())?
                .and_then(|mut map| map.remove(key)),
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        };

        if last.as_ref() != Some(&raw) {
            show(key, raw.as_ref(), as_type);
            last = Some(raw);
        }
    }
}

/// Print `raw` as stored, or decoded as `as_type`
fn show(key: &str, raw: Option<&EncodedValue>, as_type: Option<ValueType>) {
    let text = match as_type {
        None => raw.map(|value| format!("{}\t{}", value.type_name(), value)),
        Some(value_type) => render(key, raw, value_type),
    };
    println!("{}", text.as_deref().unwrap_or("(missing)"));
}

/// Either store kind behind one interface for the commands above
enum Store {
    Flat(Arc<FileStore>),
    Tx(Arc<TxStore>),
}

impl Store {
    fn open(kind: StoreKind, config: &Config) -> Result<Self> {
        Ok(match kind {
            StoreKind::Flat => Store::Flat(Arc::new(FileStore::open(config)?)),
            StoreKind::Tx => Store::Tx(Arc::new(TxStore::open(config)?)),
        })
    }

    fn get(&self, key: &str) -> Option<EncodedValue> {
        match self {
            Store::Flat(store) => store.get(key),
            Store::Tx(store) => store.snapshot().get(key).cloned(),
        }
    }

    fn entries(&self) -> Vec<(String, EncodedValue)> {
        match self {
            Store::Flat(store) => store
                .keys()
                .into_iter()
                .filter_map(|k| store.get(&k).map(|v| (k, v)))
                .collect(),
            Store::Tx(store) => store
                .snapshot()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Apply `edit` and wait for it to reach disk
    fn write(&self, edit: Edit) -> Result<()> {
        match self {
            Store::Flat(store) => store.commit(edit),
            Store::Tx(store) => store.update(edit),
        }
    }
}

/// Parse `text` as `value_type` and encode it
fn parse(text: &str, value_type: ValueType) -> Result<EncodedValue> {
    fn bad<E: std::fmt::Display>(text: &str, value_type: ValueType) -> impl FnOnce(E) -> PrefError + '_ {
        move |e| PrefError::Parse(format!("{:?} is not a valid {:?}: {}", text, value_type, e))
    }

    Ok(match value_type {
        ValueType::String => text.to_string().encode(),
        ValueType::Int => text.parse::<i32>().map_err(bad(text, value_type))?.encode(),
        ValueType::Long => text.parse::<i64>().map_err(bad(text, value_type))?.encode(),
        ValueType::Double => text.parse::<f64>().map_err(bad(text, value_type))?.encode(),
        ValueType::Bool => text.parse::<bool>().map_err(bad(text, value_type))?.encode(),
        ValueType::Date => DateTime::parse_from_rfc3339(text)
            .map_err(bad(text, value_type))?
            .with_timezone(&Utc)
            .encode(),
        ValueType::LocalDate => text.parse::<NaiveDate>().map_err(bad(text, value_type))?.encode(),
        ValueType::LocalTime => text.parse::<NaiveTime>().map_err(bad(text, value_type))?.encode(),
        ValueType::LocalDateTime => text
            .parse::<NaiveDateTime>()
            .map_err(bad(text, value_type))?
            .encode(),
    })
}

/// Decode `raw` as `value_type` and format it for display
fn render(key: &str, raw: Option<&EncodedValue>, value_type: ValueType) -> Option<String> {
    match value_type {
        ValueType::String => codec::decode_opt::<String>(key, raw).map(|v| format!("{:?}", v)),
        ValueType::Int => codec::decode_opt::<i32>(key, raw).map(|v| v.to_string()),
        ValueType::Long => codec::decode_opt::<i64>(key, raw).map(|v| v.to_string()),
        ValueType::Double => codec::decode_opt::<f64>(key, raw).map(|v| v.to_string()),
        ValueType::Bool => codec::decode_opt::<bool>(key, raw).map(|v| v.to_string()),
        ValueType::Date => codec::decode_opt::<DateTime<Utc>>(key, raw).map(|v| v.to_rfc3339()),
        ValueType::LocalDate => codec::decode_opt::<NaiveDate>(key, raw).map(|v| v.to_string()),
        ValueType::LocalTime => codec::decode_opt::<NaiveTime>(key, raw).map(|v| v.to_string()),
        ValueType::LocalDateTime => {
            codec::decode_opt::<NaiveDateTime>(key, raw).map(|v| v.to_string())
        }
    }
}
