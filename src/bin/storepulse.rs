use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storepulse_api::{
    client::ApiClient,
    models::{LineItem, Order, Product, UserProfile},
    services::{
        analytics::{
            customer_summaries, sales_by_day, status_breakdown, top_products, CustomerSummary,
            DashboardReport, DashboardStats, TOP_PRODUCT_LIMIT,
        },
        orders::{CreateOrderRequest, LineItemInput},
        products::CreateProductRequest,
    },
};
use uuid::Uuid;

const DEFAULT_API_URL: &str = "http://localhost:5000";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api_url = cli
        .api_url
        .clone()
        .or_else(|| std::env::var("STOREPULSE_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let context = CliContext::initialize(&api_url)?;

    match cli.command {
        Commands::Auth(command) => handle_auth_command(&context, command, cli.json).await?,
        Commands::Orders(command) => handle_orders_command(&context, command, cli.json).await?,
        Commands::Products(command) => handle_products_command(&context, command, cli.json).await?,
        Commands::Customers(command) => {
            handle_customers_command(&context, command, cli.json).await?
        }
        Commands::Dashboard => handle_dashboard(&context, cli.json).await?,
        Commands::Seed => handle_seed(&context, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "storepulse", about = "StorePulse CLI for the retail API", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Base URL of the StorePulse API (defaults to STOREPULSE_API_URL or http://localhost:5000)"
    )]
    api_url: Option<String>,
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Auth(AuthCommands),
    #[command(subcommand)]
    Orders(OrdersCommands),
    #[command(subcommand)]
    Products(ProductsCommands),
    #[command(subcommand)]
    Customers(CustomersCommands),
    /// Render the sales dashboard from the live order and product snapshots
    Dashboard,
    /// Load the demo catalog and order book into the server
    Seed,
}

#[derive(Subcommand)]
enum AuthCommands {
    Register(RegisterArgs),
    Login(LoginArgs),
    Whoami(WhoamiArgs),
    Logout(LogoutArgs),
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long, help = "Email address for the new account")]
    email: String,
    #[arg(long, help = "Display name for the new account")]
    name: String,
    #[arg(long, help = "Password for the new account")]
    password: String,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Persist the issued session to disk for reuse"
    )]
    save: bool,
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long, help = "Email address for the account")]
    email: String,
    #[arg(long, help = "Password for the account")]
    password: String,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Persist the issued session to disk for reuse"
    )]
    save: bool,
}

#[derive(Args)]
struct WhoamiArgs {
    #[arg(long, help = "Session token to inspect; defaults to saved session")]
    token: Option<String>,
}

#[derive(Args)]
struct LogoutArgs {
    #[arg(long, help = "Session token to revoke; defaults to saved session")]
    token: Option<String>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Also delete the saved session file if present"
    )]
    clear: bool,
}

#[derive(Subcommand)]
enum OrdersCommands {
    List,
    Get(GetOrderArgs),
    Create(CreateOrderArgs),
    Delete(DeleteOrderArgs),
}

#[derive(Args)]
struct GetOrderArgs {
    #[arg(long, value_parser = clap::value_parser!(Uuid), help = "Order identifier")]
    id: Uuid,
}

#[derive(Args)]
struct CreateOrderArgs {
    #[arg(long, help = "Customer name to record on the order")]
    customer: String,
    #[arg(long, help = "Initial status (defaults to Pending)")]
    status: Option<String>,
    #[arg(
        long = "item",
        value_parser = parse_line_item,
        action = ArgAction::Append,
        help = "Order line in key=value pairs (e.g. product_id=UUID,name=Coffee,quantity=2,price=24.99)"
    )]
    items: Vec<LineItemInput>,
}

#[derive(Args)]
struct DeleteOrderArgs {
    #[arg(long, value_parser = clap::value_parser!(Uuid), help = "Order identifier")]
    id: Uuid,
}

#[derive(Subcommand)]
enum ProductsCommands {
    List(ListProductsArgs),
    Create(CreateProductArgs),
}

#[derive(Args)]
struct ListProductsArgs {
    #[arg(long, help = "Filter by category (exact match)")]
    category: Option<String>,
}

#[derive(Args)]
struct CreateProductArgs {
    #[arg(long, help = "Display name for the product")]
    name: String,
    #[arg(long, value_parser = parse_decimal, help = "Unit price for the product")]
    price: Decimal,
    #[arg(long, help = "Optional category label")]
    category: Option<String>,
    #[arg(long, help = "Optional long-form description")]
    description: Option<String>,
    #[arg(long, help = "Public image URL")]
    image_url: Option<String>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Create the product as out of stock"
    )]
    out_of_stock: bool,
}

#[derive(Subcommand)]
enum CustomersCommands {
    List(ListCustomersArgs),
}

#[derive(Args)]
struct ListCustomersArgs {
    #[arg(long, help = "Case-insensitive substring to match customer names")]
    search: Option<String>,
}

/// Session persisted by `--save`, mirroring what the web dashboard keeps in
/// local storage.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    user: UserProfile,
    token: String,
    saved_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct AuthSessionOutput {
    user: UserProfile,
    token: String,
    saved_session_path: Option<String>,
}

struct CliContext {
    client: ApiClient,
    session: Option<(PathBuf, StoredSession)>,
}

impl CliContext {
    fn initialize(api_url: &str) -> Result<Self> {
        let session = read_session()?;
        let mut client = ApiClient::new(api_url).context("failed to build the HTTP client")?;
        if let Some((_, stored)) = &session {
            client = client.with_token(stored.token.clone());
        }
        Ok(Self { client, session })
    }

    /// Client carrying the explicit token when one was given, otherwise the
    /// saved session. Errors when neither exists.
    fn session_client(&self, token: Option<String>) -> Result<ApiClient> {
        match token {
            Some(token) => Ok(self.client.clone().with_token(token)),
            None if self.session.is_some() => Ok(self.client.clone()),
            None => Err(anyhow!(
                "no session token provided and no saved session found; \
                 run `storepulse auth login --save` or supply --token"
            )),
        }
    }
}

async fn handle_auth_command(context: &CliContext, command: AuthCommands, json: bool) -> Result<()> {
    match command {
        AuthCommands::Register(args) => {
            let response = context
                .client
                .register(&args.email, &args.name, &args.password)
                .await
                .context("failed to register")?;
            let saved_path = persist_session(args.save, &response.user, &response.token)?;

            if json {
                print_json(&AuthSessionOutput {
                    user: response.user,
                    token: response.token,
                    saved_session_path: saved_path,
                })?;
            } else {
                println!("{}: {} ({})", response.message, response.user.email, response.user.id);
                println!("Token: {}", response.token);
                if let Some(path) = saved_path {
                    println!("Session saved to: {}", path);
                }
            }
            Ok(())
        }
        AuthCommands::Login(args) => {
            let response = context
                .client
                .login(&args.email, &args.password)
                .await
                .context("failed to log in")?;
            let saved_path = persist_session(args.save, &response.user, &response.token)?;

            if json {
                print_json(&AuthSessionOutput {
                    user: response.user,
                    token: response.token,
                    saved_session_path: saved_path,
                })?;
            } else {
                println!("{}: {}", response.message, response.user.email);
                println!("Token: {}", response.token);
                if let Some(path) = saved_path {
                    println!("Session saved to: {}", path);
                }
            }
            Ok(())
        }
        AuthCommands::Whoami(args) => {
            let client = context.session_client(args.token)?;
            let response = client
                .me()
                .await
                .context("failed to fetch the active session")?;

            if json {
                print_json(&response)?;
            } else {
                println!("Email: {}", response.user.email);
                println!("Name: {}", response.user.name);
                println!("Role: {}", response.user.role);
                println!("User id: {}", response.user.id);
                println!("Registered: {}", response.user.created_at.to_rfc3339());
                if let Some((path, _)) = &context.session {
                    println!("Loaded from session: {}", path.display());
                }
            }
            Ok(())
        }
        AuthCommands::Logout(args) => {
            let client = context.session_client(args.token)?;
            let response = client.logout().await.context("failed to log out")?;

            if args.clear {
                if let Some((path, _)) = &context.session {
                    if let Err(err) = clear_session_file(path) {
                        eprintln!("Failed to remove session file {}: {}", path.display(), err);
                    } else {
                        println!("Cleared session file {}", path.display());
                    }
                }
            }

            println!("{}", response.message);
            Ok(())
        }
    }
}

async fn handle_orders_command(
    context: &CliContext,
    command: OrdersCommands,
    json: bool,
) -> Result<()> {
    match command {
        OrdersCommands::List => {
            let list = context
                .client
                .get_orders()
                .await
                .context("failed to list orders")?;
            if json {
                print_json(&list)?;
            } else if list.orders.is_empty() {
                println!("No orders recorded yet.");
            } else {
                println!("Orders ({} total)", list.count);
                for order in &list.orders {
                    render_order(order);
                }
            }
            Ok(())
        }
        OrdersCommands::Get(args) => {
            let order = context
                .client
                .get_order(args.id)
                .await
                .with_context(|| format!("failed to fetch order {}", args.id))?;
            if json {
                print_json(&order)?;
            } else {
                render_order(&order);
                for item in &order.items {
                    render_order_item(item);
                }
            }
            Ok(())
        }
        OrdersCommands::Create(args) => {
            if args.items.is_empty() {
                return Err(anyhow!(
                    "at least one --item argument is required. \
                     Format: product_id=UUID,name=Label,quantity=1,price=9.99"
                ));
            }

            let request = CreateOrderRequest {
                customer_name: args.customer,
                items: args.items,
                status: args.status,
                total_amount: None,
                created_at: None,
            };
            let order = context
                .client
                .create_order(&request)
                .await
                .context("failed to create order")?;

            if json {
                print_json(&order)?;
            } else {
                println!("Created order {}", order.id);
                render_order(&order);
            }
            Ok(())
        }
        OrdersCommands::Delete(args) => {
            context
                .client
                .delete_order(args.id)
                .await
                .with_context(|| format!("failed to delete order {}", args.id))?;
            if json {
                print_json(&serde_json::json!({
                    "order_id": args.id,
                    "status": "deleted"
                }))?;
            } else {
                println!("Order {} deleted", args.id);
            }
            Ok(())
        }
    }
}

async fn handle_products_command(
    context: &CliContext,
    command: ProductsCommands,
    json: bool,
) -> Result<()> {
    match command {
        ProductsCommands::List(args) => {
            let list = context
                .client
                .get_products(args.category.as_deref())
                .await
                .context("failed to list products")?;
            if json {
                print_json(&list)?;
            } else if list.products.is_empty() {
                println!("No products in the catalog.");
            } else {
                println!("Products ({} total)", list.count);
                for product in &list.products {
                    render_product(product);
                }
            }
            Ok(())
        }
        ProductsCommands::Create(args) => {
            let request = CreateProductRequest {
                name: args.name,
                price: args.price,
                category: args.category,
                description: args.description,
                image_url: args.image_url,
                in_stock: !args.out_of_stock,
            };
            let product = context
                .client
                .create_product(&request)
                .await
                .context("failed to create product")?;

            if json {
                print_json(&product)?;
            } else {
                println!("Created product {} ({})", product.id, product.name);
            }
            Ok(())
        }
    }
}

async fn handle_customers_command(
    context: &CliContext,
    command: CustomersCommands,
    json: bool,
) -> Result<()> {
    match command {
        CustomersCommands::List(args) => {
            let list = context
                .client
                .get_orders()
                .await
                .context("failed to fetch orders")?;
            let mut customers = customer_summaries(&list.orders);

            if let Some(term) = args.search.as_ref() {
                let needle = term.to_lowercase();
                customers.retain(|c| c.customer_name.to_lowercase().contains(&needle));
            }

            if json {
                print_json(&customers)?;
            } else if customers.is_empty() {
                println!("No customers matched.");
            } else {
                println!("Customers ({} total)", customers.len());
                for customer in &customers {
                    render_customer(customer);
                }
            }
            Ok(())
        }
    }
}

/// The dashboard folds run client side over the fetched snapshots, the same
/// aggregation the web dashboard performs.
async fn handle_dashboard(context: &CliContext, json: bool) -> Result<()> {
    let (orders, products) = tokio::try_join!(
        context.client.get_orders(),
        context.client.get_products(None)
    )
    .context("failed to fetch dashboard snapshots")?;

    let orders = orders.orders;
    let products = products.products;

    let total_revenue: Decimal = orders.iter().map(|o| o.total_amount).sum();
    let active_products = products.iter().filter(|p| p.in_stock).count() as u64;
    let report = DashboardReport {
        stats: DashboardStats {
            total_revenue,
            total_orders: orders.len() as u64,
            active_products,
            out_of_stock: products.len() as u64 - active_products,
        },
        status_breakdown: status_breakdown(&orders),
        top_products: top_products(&orders, TOP_PRODUCT_LIMIT),
        sales_trend: sales_by_day(&orders),
        generated_at: Utc::now(),
    };

    if json {
        print_json(&report)?;
    } else {
        render_dashboard(&report);
    }
    Ok(())
}

async fn handle_seed(context: &CliContext, json: bool) -> Result<()> {
    let report = context
        .client
        .seed()
        .await
        .context("failed to seed demo data")?;
    if json {
        print_json(&report)?;
    } else {
        println!(
            "{} ({} products, {} orders)",
            report.message, report.products, report.orders
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_order(order: &Order) {
    let created = order
        .created_at
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "undated".to_string());
    println!(
        "- Order {} • {} • status {} • total {} • {}",
        order.id, order.customer_name, order.status, order.total_amount, created
    );
}

fn render_order_item(item: &LineItem) {
    println!(
        "  • {} x {} @ {}",
        item.quantity, item.product_name, item.price
    );
}

fn render_product(product: &Product) {
    let category = product.category.as_deref().unwrap_or("uncategorized");
    let stock = if product.in_stock {
        "in stock"
    } else {
        "out of stock"
    };
    println!(
        "- Product {} • {} • {} • {} • {}",
        product.id, product.name, product.price, category, stock
    );
}

fn render_customer(customer: &CustomerSummary) {
    println!(
        "- {} • {} order(s) • spent {} • last order {}",
        customer.customer_name,
        customer.total_orders,
        customer.total_spent,
        customer.last_order_date.to_rfc3339()
    );
}

fn render_dashboard(report: &DashboardReport) {
    println!(
        "Revenue {} across {} orders",
        report.stats.total_revenue, report.stats.total_orders
    );
    println!(
        "Catalog: {} in stock, {} out of stock",
        report.stats.active_products, report.stats.out_of_stock
    );
    if !report.status_breakdown.is_empty() {
        println!("Orders by status:");
        for bucket in &report.status_breakdown {
            println!("  • {} {}", bucket.count, bucket.status);
        }
    }
    if !report.top_products.is_empty() {
        println!("Top products:");
        for product in &report.top_products {
            println!("  • {} x {}", product.total_quantity, product.product_name);
        }
    }
    if !report.sales_trend.is_empty() {
        println!("Sales by day:");
        for day in &report.sales_trend {
            println!("  • {} {}", day.date, day.total_sales);
        }
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|_| format!("invalid decimal '{raw}'"))
}

fn parse_line_item(raw: &str) -> Result<LineItemInput, String> {
    let mut product_id = None;
    let mut name = None;
    let mut quantity = None;
    let mut price = None;

    for part in raw.split(',') {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| format!("invalid segment '{part}', expected key=value"))?;
        let key = key.trim();
        let value = value.trim();

        match key {
            "product_id" => {
                let id = Uuid::parse_str(value)
                    .map_err(|_| format!("invalid product_id '{value}'"))?;
                product_id = Some(id);
            }
            "name" | "product_name" => {
                if value.is_empty() {
                    return Err("name cannot be empty".to_string());
                }
                name = Some(value.to_string());
            }
            "quantity" => {
                let qty: u32 = value
                    .parse()
                    .map_err(|_| format!("invalid quantity '{value}'"))?;
                if qty == 0 {
                    return Err("quantity must be positive".to_string());
                }
                quantity = Some(qty);
            }
            "price" | "unit_price" => {
                let parsed = Decimal::from_str(value)
                    .map_err(|_| format!("invalid price '{value}'"))?;
                price = Some(parsed);
            }
            other => {
                return Err(format!("unrecognized key '{other}' in item definition"));
            }
        }
    }

    let product_id =
        product_id.ok_or_else(|| "item must include product_id=<UUID>".to_string())?;
    let product_name = name.ok_or_else(|| "item must include name=<value>".to_string())?;
    let quantity = quantity.ok_or_else(|| "item must include quantity=<integer>".to_string())?;
    let price = price.ok_or_else(|| "item must include price=<decimal>".to_string())?;

    Ok(LineItemInput {
        product_id,
        product_name,
        quantity,
        price,
    })
}

fn session_file_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("STOREPULSE_CLI_HOME") {
        let mut path = PathBuf::from(dir);
        if path.file_name().is_none() {
            path.push("session.json");
        }
        return Some(path);
    }

    std::env::var("HOME").ok().map(|home| {
        let mut path = PathBuf::from(home);
        path.push(".storepulse");
        path.push("session.json");
        path
    })
}

fn persist_session(save: bool, user: &UserProfile, token: &str) -> Result<Option<String>> {
    if !save {
        return Ok(None);
    }

    if let Some(path) = session_file_path() {
        let session = StoredSession {
            user: user.clone(),
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        save_session(&path, &session)?;
        Ok(Some(path.display().to_string()))
    } else {
        eprintln!("Skipping session persistence: no suitable directory found.");
        Ok(None)
    }
}

fn save_session(path: &Path, session: &StoredSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let payload = serde_json::to_vec_pretty(session)?;
    fs::write(path, payload).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}

fn read_session() -> Result<Option<(PathBuf, StoredSession)>> {
    let path = match session_file_path() {
        Some(path) => path,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read session file {}", path.display()))?;
    let session: StoredSession = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse session file {}", path.display()))?;
    Ok(Some((path, session)))
}

fn clear_session_file(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}
