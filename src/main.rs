use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use digireceipt::config::{config_dir, load_config, CONFIG_TEMPLATE};
use digireceipt::invoice::{
    issue, next_number, receipt_file_name, write_items_csv, write_receipt, ClientDetails, DocType,
    Draft, InvoiceDocument, ItemInput, Vendor,
};
use digireceipt::pdf::Language;
use digireceipt::store::{RecordStore, SCHEMA_VERSION};
use digireceipt::{Config, ReceiptError, Result};

#[derive(Parser)]
#[command(name = "digireceipt")]
#[command(version, about = "Invoice and quote generator with printable QR receipts", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.digireceipt or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Owner id, e.g. your shop ID (default: 'owner' in config.toml)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Issue a new invoice or quote
    Generate {
        /// Document type: invoice or quote
        #[arg(short = 't', long = "type", default_value = "invoice")]
        doc_type: String,

        /// Line items in format "name:quantity:price" (can be repeated)
        #[arg(short, long, value_name = "NAME:QTY:PRICE")]
        item: Vec<String>,

        /// Discount amount taken off the subtotal
        #[arg(short, long, default_value_t = 0.0)]
        discount: f64,

        #[command(flatten)]
        vendor: VendorArgs,

        #[command(flatten)]
        client: ClientArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Load a stored document, apply changes and issue it under a new number
    Reissue {
        /// Invoice number to start from
        invoice: String,

        /// Change the document type (invoice or quote)
        #[arg(short = 't', long = "type")]
        doc_type: Option<String>,

        /// Replacement line items "name:quantity:price" (replaces all items)
        #[arg(short, long, value_name = "NAME:QTY:PRICE")]
        item: Vec<String>,

        /// Replacement discount amount
        #[arg(short, long)]
        discount: Option<f64>,

        #[command(flatten)]
        vendor: VendorArgs,

        #[command(flatten)]
        client: ClientArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show a stored document
    Show {
        /// Invoice number
        invoice: String,

        /// Print the stored JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// List issued documents, newest first
    List {
        /// Number of documents to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List saved clients
    Clients,

    /// Render the receipt PDF of a stored document again
    Pdf {
        /// Invoice number
        invoice: String,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Export the items of a stored document as CSV
    Export {
        /// Invoice number
        invoice: String,

        /// Directory to write <number>_items.csv into (default: output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show database status and the next invoice number
    Status,
}

/// Vendor fields; any given value overrides config.toml or the stored document
#[derive(Args)]
struct VendorArgs {
    #[arg(long)]
    vendor_name: Option<String>,
    #[arg(long)]
    vendor_address: Option<String>,
    #[arg(long)]
    vendor_phone: Option<String>,
    /// Vendor NTN
    #[arg(long)]
    vendor_tax_id: Option<String>,
}

impl VendorArgs {
    fn apply(self, base: Vendor) -> Vendor {
        Vendor {
            name: self.vendor_name.unwrap_or(base.name),
            address: self.vendor_address.unwrap_or(base.address),
            phone: self.vendor_phone.unwrap_or(base.phone),
            tax_id: self.vendor_tax_id.unwrap_or(base.tax_id),
        }
    }
}

/// Client details are kept for your records and never printed
#[derive(Args)]
struct ClientArgs {
    #[arg(long)]
    client_name: Option<String>,
    #[arg(long)]
    client_address: Option<String>,
    #[arg(long)]
    client_phone: Option<String>,
    /// Client NTN
    #[arg(long)]
    client_tax_id: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl ClientArgs {
    fn apply(self, base: ClientDetails) -> ClientDetails {
        ClientDetails {
            name: self.client_name.unwrap_or(base.name),
            address: self.client_address.unwrap_or(base.address),
            phone: self.client_phone.unwrap_or(base.phone),
            tax_id: self.client_tax_id.unwrap_or(base.tax_id),
            notes: self.notes.unwrap_or(base.notes),
        }
    }
}

#[derive(Args)]
struct RenderArgs {
    /// Receipt language: english or urdu (default: from config.toml)
    #[arg(long)]
    language: Option<String>,

    /// Logo image printed on top (default: pdf.logo from config.toml)
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Custom PDF path (default: output_dir/<number>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write <number>_items.csv next to the receipts
    #[arg(long)]
    csv: bool,

    /// Skip rendering the PDF
    #[arg(long)]
    no_pdf: bool,

    /// Open generated PDF with system default viewer
    #[arg(long)]
    open: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    let owner = cli.owner;
    let load = || Context::load(cfg_dir.clone(), owner.as_deref());

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Generate {
            doc_type,
            item,
            discount,
            vendor,
            client,
            render,
        } => {
            let ctx = load()?;
            let draft = Draft::new(doc_type.parse::<DocType>()?)
                .with_vendor(vendor.apply(ctx.config.vendor.clone()))
                .with_client(client.apply(ClientDetails::default()))
                .with_items(parse_items(&item)?)
                .with_discount(discount);
            cmd_issue(&ctx, draft, &render)
        }
        Commands::Reissue {
            invoice,
            doc_type,
            item,
            discount,
            vendor,
            client,
            render,
        } => {
            let ctx = load()?;
            let original = ctx.open_store()?.get(&invoice, ctx.owner()?)?;
            println!(
                "Loaded {} {}. Issuing a new number for the edited copy.",
                original.doc_type, original.invoice_no
            );
            let draft = edit_draft(
                Draft::from_document(&original),
                doc_type,
                &item,
                discount,
                vendor,
                client,
            )?;
            cmd_issue(&ctx, draft, &render)
        }
        Commands::Show { invoice, json } => cmd_show(&load()?, &invoice, json),
        Commands::List { limit } => cmd_list(&load()?, limit),
        Commands::Clients => cmd_clients(&load()?),
        Commands::Pdf { invoice, render } => cmd_pdf(&load()?, &invoice, &render),
        Commands::Export {
            invoice,
            output_dir,
        } => cmd_export(&load()?, &invoice, output_dir),
        Commands::Status => cmd_status(&load()?),
    }
}

/// Loaded configuration plus the owner id for this invocation
struct Context {
    cfg_dir: PathBuf,
    config: Config,
    owner: Option<String>,
}

impl Context {
    fn load(cfg_dir: PathBuf, cli_owner: Option<&str>) -> Result<Self> {
        let config = load_config(&cfg_dir)?;
        let owner = config.resolve_owner(cli_owner).ok();
        Ok(Self {
            cfg_dir,
            config,
            owner,
        })
    }

    fn owner(&self) -> Result<&str> {
        self.owner.as_deref().ok_or(ReceiptError::MissingOwner)
    }

    fn database_path(&self) -> PathBuf {
        self.config.database_path(&self.cfg_dir)
    }

    fn open_store(&self) -> Result<RecordStore> {
        RecordStore::open(&self.database_path())
    }

    fn output_dir(&self) -> PathBuf {
        self.config.output_dir(&self.cfg_dir)
    }
}

fn parse_items(inputs: &[String]) -> Result<Vec<ItemInput>> {
    inputs
        .iter()
        .map(|s| ItemInput::parse(s).map_err(ReceiptError::from))
        .collect()
}

fn edit_draft(
    draft: Draft,
    doc_type: Option<String>,
    items: &[String],
    discount: Option<f64>,
    vendor: VendorArgs,
    client: ClientArgs,
) -> Result<Draft> {
    let mut draft = draft;
    if let Some(t) = doc_type {
        draft = draft.with_doc_type(t.parse::<DocType>()?);
    }
    if !items.is_empty() {
        draft = draft.with_items(parse_items(items)?);
    }
    if let Some(d) = discount {
        draft = draft.with_discount(d);
    }
    let vendor = vendor.apply(draft.vendor().clone());
    let client = client.apply(draft.client().clone());
    Ok(draft.with_vendor(vendor).with_client(client))
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(ReceiptError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized digireceipt config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set your owner id and shop details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Issue your first document:");
    println!("     digireceipt generate --item \"Tea:2:50\" --discount 10");

    Ok(())
}

/// Issue a draft and write its receipt and CSV
fn cmd_issue(ctx: &Context, draft: Draft, render: &RenderArgs) -> Result<()> {
    let owner = ctx.owner()?;
    let mut store = ctx.open_store()?;
    let doc = issue(&mut store, &draft, owner)?;

    println!("Generated {} {}", doc.doc_type, doc.invoice_no);
    println!("  Vendor:      {}", doc.vendor.name);
    println!("  Items:       {}", doc.items().len());
    println!("  Subtotal:    {:.2}", doc.subtotal());
    println!("  Discount:    {:.2}", doc.discount());
    println!("  Grand Total: {:.2}", doc.grand_total());

    // Render from the stored copy so the QR code holds exactly what was saved
    let stored = store.get(&doc.invoice_no, owner)?;
    write_outputs(ctx, &stored, render)
}

fn write_outputs(ctx: &Context, doc: &InvoiceDocument, render: &RenderArgs) -> Result<()> {
    if !render.no_pdf {
        let language = match &render.language {
            Some(l) => l.parse::<Language>()?,
            None => ctx.config.language,
        };
        let logo = render
            .logo
            .clone()
            .or_else(|| ctx.config.logo_path(&ctx.cfg_dir));
        let pdf_path = render
            .output
            .clone()
            .unwrap_or_else(|| ctx.output_dir().join(receipt_file_name(doc)));

        write_receipt(doc, &pdf_path, logo.as_deref(), language)?;
        println!("  Saved:       {}", pdf_path.display());

        if render.open {
            open_path(&pdf_path)?;
        }
    }

    if render.csv {
        let csv_path = write_items_csv(doc, &ctx.output_dir())?;
        println!("  Items CSV:   {}", csv_path.display());
    }

    Ok(())
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ITEM")]
    name: String,
    #[tabled(rename = "QTY")]
    quantity: u32,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "VENDOR")]
    vendor: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "NTN")]
    tax_id: String,
    #[tabled(rename = "ADDED")]
    added: String,
}

/// Show a stored document
fn cmd_show(ctx: &Context, invoice_no: &str, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let doc = store.get(invoice_no, ctx.owner()?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let title = match doc.doc_type {
        DocType::Invoice => "Invoice",
        DocType::Quote => "Quote",
    };
    println!("{} {}", title, doc.invoice_no);
    println!("{}", "-".repeat(50));
    println!("Issued:   {}", doc.issued_at.format("%Y-%m-%d %H:%M UTC"));
    println!("Vendor:   {}", doc.vendor.name);
    println!("          {}", doc.vendor.address);
    println!("          Phone: {}  NTN: {}", doc.vendor.phone, doc.vendor.tax_id);
    if !doc.client.is_empty() {
        println!("Client:   {}", doc.client.name);
        if !doc.client.phone.is_empty() {
            println!("          Phone: {}", doc.client.phone);
        }
        if !doc.client.notes.is_empty() {
            println!("          Notes: {}", doc.client.notes);
        }
    }
    println!();

    let rows: Vec<ItemRow> = doc
        .items()
        .iter()
        .enumerate()
        .map(|(idx, item)| ItemRow {
            index: idx + 1,
            name: item.name().to_string(),
            quantity: item.quantity(),
            price: format!("{:.2}", item.unit_price()),
            total: format!("{:.2}", item.line_total()),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!("Subtotal:    {:>10.2}", doc.subtotal());
    println!("Discount:    {:>10.2}", doc.discount());
    println!("Grand Total: {:>10.2}", doc.grand_total());

    Ok(())
}

/// List issued documents, newest first
fn cmd_list(ctx: &Context, limit: Option<usize>) -> Result<()> {
    let store = ctx.open_store()?;
    let summaries = store.list(ctx.owner()?)?;

    if summaries.is_empty() {
        println!("No past documents found.");
        return Ok(());
    }

    let shown = limit.unwrap_or(summaries.len());
    let rows: Vec<DocumentRow> = summaries
        .iter()
        .rev()
        .take(shown)
        .enumerate()
        .map(|(idx, s)| DocumentRow {
            index: idx + 1,
            number: s.invoice_no.clone(),
            date: s.issued_at.format("%Y-%m-%d").to_string(),
            vendor: s.vendor_name.clone(),
            total: format!("{:.2}", s.grand_total),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} documents", summaries.len());

    Ok(())
}

/// List saved clients
fn cmd_clients(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let clients = store.list_clients(ctx.owner()?)?;

    if clients.is_empty() {
        println!("No clients saved yet.");
        println!("Clients are saved when a document is issued with --client-name.");
        return Ok(());
    }

    let rows: Vec<ClientRow> = clients
        .into_iter()
        .map(|c| ClientRow {
            name: c.details.name,
            phone: c.details.phone,
            address: c.details.address,
            tax_id: c.details.tax_id,
            added: c.created_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

/// Render the receipt of a stored document again
fn cmd_pdf(ctx: &Context, invoice_no: &str, render: &RenderArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let doc = store.get(invoice_no, ctx.owner()?)?;
    println!("Rendering {} {}", doc.doc_type, doc.invoice_no);
    write_outputs(ctx, &doc, render)
}

/// Write the items CSV of a stored document
fn cmd_export(ctx: &Context, invoice_no: &str, output_dir: Option<PathBuf>) -> Result<()> {
    let store = ctx.open_store()?;
    let doc = store.get(invoice_no, ctx.owner()?)?;
    let dir = output_dir.unwrap_or_else(|| ctx.output_dir());
    let path = write_items_csv(&doc, &dir)?;
    println!("Exported {} items to {}", doc.items().len(), path.display());
    Ok(())
}

/// Show database status and the next number
fn cmd_status(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let owner = ctx.owner.as_deref().unwrap_or("(not set)");

    println!("DigiReceipt Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", ctx.cfg_dir.display());
    println!("Database:         {}", ctx.database_path().display());
    println!("Schema version:   {}", SCHEMA_VERSION);
    println!("Owner:            {}", owner);
    println!("Vendor:           {}", ctx.config.vendor.name);

    if let Some(owner) = ctx.owner.as_deref() {
        println!("Documents:        {}", store.list(owner)?.len());
        println!("Clients:          {}", store.list_clients(owner)?.len());
        println!("Next number:      {}", next_number(&store, owner)?);
        println!();
        println!("Note: numbers are shared by every owner in this database.");
    }

    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}
