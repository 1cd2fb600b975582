//! `fintrack`: browse and edit personal-finance data from the terminal.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use dialoguer::{Confirm as ConfirmPrompt, Password};
use fintrack_rs::auth::BlockingAuthSession;
use fintrack_rs::chart::{ChartPoint, TimeRange, cumulative_series};
use fintrack_rs::client::{DEFAULT_BASE_URL, FinanceBlockingClient};
use fintrack_rs::collection::{AssumeYes, BlockingCollection, Confirm, DeleteOutcome};
use fintrack_rs::credentials::{FileTokenStore, TokenStore};
use fintrack_rs::error::FinanceError;
use fintrack_rs::filters::{
    DEFAULT_PAGE_SIZE, PlanningFilters, PlanningQuery, TransactionFilters, TransactionQuery,
};
use fintrack_rs::format::{brl, date_br, month_name_pt, parse_amount};
use fintrack_rs::models::{
    Account, AccountId, AccountInput, Category, CategoryId, CategoryInput, DashboardSummary,
    Decimal, NaiveDate, Page, PlanningEntry, PlanningId, PlanningInput, Transaction,
    TransactionDraft, TransactionId, TransactionType,
};
use fintrack_rs::resource::Resource;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use secrecy::SecretString;

/// Personal finance tracker: accounts, transactions, planning and dashboard.
#[derive(Debug, Parser)]
#[command(name = "fintrack", version, about)]
struct Cli {
    /// Backend base URL, including the `/api` prefix.
    #[arg(long, global = true, env = "FINTRACK_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,
    /// Override the token directory (default: XDG data dir).
    #[arg(long, global = true, env = "FINTRACK_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Answer yes to every confirmation prompt.
    #[arg(long, short = 'y', global = true)]
    yes: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and store the session token.
    Login {
        /// Account email.
        email: String,
        /// Password (prompted when omitted).
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session token.
    Logout,
    /// Create a user account.
    Register {
        /// Account email.
        email: String,
        /// Display name.
        #[arg(long)]
        name: Option<String>,
        /// Password (prompted when omitted).
        #[arg(long)]
        password: Option<String>,
    },
    /// Request a password-reset email.
    ForgotPassword {
        /// Account email.
        email: String,
    },
    /// Set a new password with the token from the reset email.
    ResetPassword {
        /// Reset token.
        token: String,
        /// New password (prompted when omitted).
        #[arg(long)]
        password: Option<String>,
    },
    /// Show the signed-in user.
    Whoami,
    /// Change the display name of the signed-in user.
    Profile {
        /// New display name.
        name: String,
    },
    /// Change the password of the signed-in user.
    ChangePassword,
    /// Previous, current and next month at a glance.
    Dashboard,
    /// Cumulative income, expense and transfer totals.
    Chart {
        /// Window: week, month, year or max.
        #[arg(long, default_value_t = TimeRange::Month)]
        range: TimeRange,
    },
    /// Manage accounts.
    #[command(subcommand)]
    Accounts(AccountCommand),
    /// Manage categories.
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Manage transactions.
    #[command(subcommand)]
    Transactions(TransactionCommand),
    /// Manage the monthly budget plan.
    #[command(subcommand)]
    Planning(PlanningCommand),
}

impl Command {
    /// Whether the command needs a signed-in user.
    const fn requires_session(&self) -> bool {
        !matches!(
            *self,
            Self::Login { .. }
                | Self::Logout
                | Self::Register { .. }
                | Self::ForgotPassword { .. }
                | Self::ResetPassword { .. }
        )
    }
}

/// `accounts` subcommands.
#[derive(Debug, Subcommand)]
enum AccountCommand {
    /// List accounts with their balances.
    List,
    /// Open an account.
    Add {
        /// Account name.
        name: String,
        /// Opening balance.
        #[arg(long, value_parser = parse_money, default_value = "0")]
        initial_balance: Decimal,
    },
    /// Rename an account or change its opening balance.
    Edit {
        /// Account to change.
        id: AccountId,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New opening balance.
        #[arg(long, value_parser = parse_money)]
        initial_balance: Option<Decimal>,
    },
    /// Delete an account.
    Delete {
        /// Account to delete.
        id: AccountId,
    },
}

/// `categories` subcommands.
#[derive(Debug, Subcommand)]
enum CategoryCommand {
    /// List categories.
    List,
    /// Create a category.
    Add {
        /// Category name.
        name: String,
    },
    /// Rename a category.
    Edit {
        /// Category to rename.
        id: CategoryId,
        /// New name.
        name: String,
    },
    /// Delete a category.
    Delete {
        /// Category to delete.
        id: CategoryId,
    },
    /// Delete several categories at once.
    DeleteMany {
        /// Categories to delete.
        #[arg(required = true, num_args = 1..)]
        ids: Vec<CategoryId>,
    },
}

/// `transactions` subcommands.
#[derive(Debug, Subcommand)]
enum TransactionCommand {
    /// List transactions, one page at a time.
    List {
        /// Filters.
        #[command(flatten)]
        filters: TransactionFilterArgs,
        /// Paging.
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Record a transaction.
    Add(TransactionFormArgs),
    /// Change a transaction; omitted fields keep their value.
    Edit {
        /// Transaction to change.
        id: TransactionId,
        /// New values.
        #[command(flatten)]
        form: TransactionFormArgs,
    },
    /// Delete a transaction.
    Delete {
        /// Transaction to delete.
        id: TransactionId,
    },
    /// Delete several transactions at once.
    DeleteMany {
        /// Transactions to delete.
        #[arg(required = true, num_args = 1..)]
        ids: Vec<TransactionId>,
    },
    /// Download matching transactions as a spreadsheet.
    Export {
        /// Filters.
        #[command(flatten)]
        filters: TransactionFilterArgs,
        /// Destination file.
        #[arg(long, short, default_value = "transactions.xlsx")]
        output: PathBuf,
    },
    /// Upload a spreadsheet of transactions.
    Import {
        /// Spreadsheet to upload.
        file: PathBuf,
    },
}

/// `planning` subcommands.
#[derive(Debug, Subcommand)]
enum PlanningCommand {
    /// List planning entries.
    List {
        /// Only this month (1-12).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Only this year.
        #[arg(long)]
        year: Option<i32>,
        /// Only this category.
        #[arg(long)]
        category: Option<CategoryId>,
        /// Paging.
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Plan an amount for a month.
    Add {
        /// Month (1-12).
        month: u32,
        /// Year.
        year: i32,
        /// Planned amount.
        #[arg(value_parser = parse_money)]
        amount: Decimal,
        /// Planned category.
        #[arg(long)]
        category: Option<CategoryId>,
    },
    /// Change a planning entry; omitted fields keep their value.
    Edit {
        /// Entry to change.
        id: PlanningId,
        /// New month.
        #[arg(long)]
        month: Option<u32>,
        /// New year.
        #[arg(long)]
        year: Option<i32>,
        /// New planned amount.
        #[arg(long, value_parser = parse_money)]
        amount: Option<Decimal>,
        /// New category.
        #[arg(long)]
        category: Option<CategoryId>,
    },
    /// Delete a planning entry.
    Delete {
        /// Entry to delete.
        id: PlanningId,
    },
    /// Delete several planning entries at once.
    DeleteMany {
        /// Entries to delete.
        #[arg(required = true, num_args = 1..)]
        ids: Vec<PlanningId>,
    },
}

/// Transaction list filters.
#[derive(Debug, Default, Args)]
struct TransactionFilterArgs {
    /// Name contains.
    #[arg(long)]
    name: Option<String>,
    /// First date (inclusive, YYYY-MM-DD or DD/MM/YYYY).
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// Last date (inclusive, YYYY-MM-DD or DD/MM/YYYY).
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Category id.
    #[arg(long)]
    category: Option<CategoryId>,
    /// Transaction type: income, expense, transfer or card.
    #[arg(long = "type")]
    kind: Option<TransactionType>,
}

impl TransactionFilterArgs {
    /// Converts the arguments to query filters.
    fn to_filters(&self) -> TransactionFilters {
        TransactionFilters {
            name: self.name.clone(),
            start_date: self.from,
            end_date: self.to,
            category_id: self.category,
            transaction_type: self.kind,
        }
    }
}

/// Paging arguments shared by list commands.
#[derive(Debug, Args)]
struct PageArgs {
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
    /// Items per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    size: u32,
}

impl Default for PageArgs {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Transaction form fields.
#[derive(Debug, Default, Args)]
struct TransactionFormArgs {
    /// Transaction type: income, expense, transfer or card.
    #[arg(long = "type")]
    kind: Option<TransactionType>,
    /// Description.
    #[arg(long)]
    name: Option<String>,
    /// Amount (1234.56 or 1.234,56).
    #[arg(long, value_parser = parse_money)]
    amount: Option<Decimal>,
    /// Date (default: today for new transactions).
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Category id.
    #[arg(long)]
    category: Option<CategoryId>,
    /// Source account (expense, card, transfer).
    #[arg(long)]
    from_account: Option<AccountId>,
    /// Destination account (income, transfer).
    #[arg(long)]
    to_account: Option<AccountId>,
    /// Number of card installments.
    #[arg(long)]
    installments: Option<u32>,
}

impl TransactionFormArgs {
    /// Overwrites the fields of `draft` that were given on the command line.
    fn apply(&self, draft: &mut TransactionDraft) {
        if let Some(kind) = self.kind {
            draft.transaction_type = kind;
        }
        if let Some(name) = self.name.as_ref() {
            draft.name.clone_from(name);
        }
        if self.amount.is_some() {
            draft.amount = self.amount;
        }
        if self.date.is_some() {
            draft.creation_date = self.date;
        }
        if self.category.is_some() {
            draft.category = self.category;
        }
        if self.from_account.is_some() {
            draft.out_account = self.from_account;
        }
        if self.to_account.is_some() {
            draft.in_account = self.to_account;
        }
        if self.installments.is_some() {
            draft.total_installments = self.installments;
        }
    }
}

/// Parses a date in `YYYY-MM-DD` or `DD/MM/YYYY` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|err| format!("{err} (expected YYYY-MM-DD or DD/MM/YYYY)"))
}

/// Parses a money amount for clap.
fn parse_money(s: &str) -> Result<Decimal, String> {
    parse_amount(s).ok_or_else(|| format!("`{s}` is not an amount"))
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut session = match open_session(&cli.api_url, cli.data_dir) {
        Ok(session) => session,
        Err(err) => return report("failed to open session", &err),
    };
    if let Err(err) = session.restore() {
        return report("failed to read stored session", &err);
    }

    let mut confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(|prompt: &str| {
            ConfirmPrompt::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false)
        })
    };

    dispatch(&mut session, cli.command, confirm.as_mut())
}

/// Opens a session against `api_url`, keeping the token under `data_dir`
/// if provided or the default XDG data directory otherwise.
fn open_session(
    api_url: &str,
    data_dir: Option<PathBuf>,
) -> fintrack_rs::Result<BlockingAuthSession<FileTokenStore>> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileTokenStore::default_dir()?,
    };
    let store = Arc::new(FileTokenStore::new(dir)?);
    BlockingAuthSession::new(FinanceBlockingClient::builder().base_url(api_url), store)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: TokenStore + 'static>(
    session: &mut BlockingAuthSession<S>,
    command: Command,
    confirm: &mut dyn Confirm,
) -> io::Result<ExitCode> {
    if command.requires_session() {
        if let Err(err) = session.require_user() {
            return report("not signed in", &err);
        }
    }

    match command {
        Command::Login { email, password } => cmd_login(session, &email, password),
        Command::Logout => cmd_logout(session),
        Command::Register {
            email,
            name,
            password,
        } => cmd_register(session, &email, name.as_deref(), password),
        Command::ForgotPassword { email } => cmd_forgot_password(session, &email),
        Command::ResetPassword { token, password } => {
            cmd_reset_password(session, &token, password)
        }
        Command::Whoami => cmd_whoami(session),
        Command::Profile { name } => cmd_profile(session, &name),
        Command::ChangePassword => cmd_change_password(session),
        Command::Dashboard => cmd_dashboard(session.client()),
        Command::Chart { range } => cmd_chart(session.client(), range),
        Command::Accounts(sub) => cmd_accounts(session.client(), sub, confirm),
        Command::Categories(sub) => cmd_categories(session.client(), sub, confirm),
        Command::Transactions(sub) => cmd_transactions(session.client(), sub, confirm),
        Command::Planning(sub) => cmd_planning(session.client(), sub, confirm),
    }
}

// ── Authentication ───────────────────────────────────────────────────

/// Uses the password given on the command line or prompts for it.
fn read_password(given: Option<String>, prompt: &str, confirm: bool) -> io::Result<SecretString> {
    if let Some(password) = given {
        return Ok(SecretString::from(password));
    }
    let mut input = Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Repeat password", "Passwords do not match");
    }
    input
        .interact()
        .map(SecretString::from)
        .map_err(io::Error::other)
}

/// Executes `login`.
fn cmd_login<S: TokenStore + 'static>(
    session: &mut BlockingAuthSession<S>,
    email: &str,
    password: Option<String>,
) -> io::Result<ExitCode> {
    let secret = read_password(password, "Password", false)?;
    let spinner = make_spinner("Signing in...");
    let result = session.login(email, &secret);
    spinner.finish_and_clear();
    match result {
        Ok(user) => {
            writeln!(
                io::stdout().lock(),
                "{} as {}",
                "Signed in".green().bold(),
                user.display_name().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("login failed", &err),
    }
}

/// Executes `logout`.
fn cmd_logout<S: TokenStore + 'static>(
    session: &mut BlockingAuthSession<S>,
) -> io::Result<ExitCode> {
    match session.logout() {
        Ok(()) => {
            writeln!(io::stdout().lock(), "{}", "Signed out.".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("failed to clear stored token", &err),
    }
}

/// Executes `register`.
fn cmd_register<S: TokenStore + 'static>(
    session: &BlockingAuthSession<S>,
    email: &str,
    name: Option<&str>,
    password: Option<String>,
) -> io::Result<ExitCode> {
    let secret = read_password(password, "Password", true)?;
    let spinner = make_spinner("Creating account...");
    let result = session.register(name, email, &secret);
    spinner.finish_and_clear();
    match result {
        Ok(()) => {
            let mut out = io::stdout().lock();
            writeln!(out, "{} {email}", "Registered".green().bold())?;
            writeln!(out, "  {} run `fintrack login {email}`", "next:".cyan())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("registration failed", &err),
    }
}

/// Executes `forgot-password`.
fn cmd_forgot_password<S: TokenStore + 'static>(
    session: &BlockingAuthSession<S>,
    email: &str,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Requesting reset email...");
    let result = session.forgot_password(email);
    spinner.finish_and_clear();
    match result {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} check {email} for a reset link",
                "Sent.".green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("reset request failed", &err),
    }
}

/// Executes `reset-password`.
fn cmd_reset_password<S: TokenStore + 'static>(
    session: &BlockingAuthSession<S>,
    token: &str,
    password: Option<String>,
) -> io::Result<ExitCode> {
    let secret = read_password(password, "New password", true)?;
    match session.reset_password(token, &secret) {
        Ok(()) => {
            writeln!(io::stdout().lock(), "{}", "Password reset.".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("password reset failed", &err),
    }
}

/// Executes `whoami`.
fn cmd_whoami<S: TokenStore + 'static>(
    session: &BlockingAuthSession<S>,
) -> io::Result<ExitCode> {
    match session.require_user() {
        Ok(user) => {
            let mut out = io::stdout().lock();
            writeln!(
                out,
                "{} {}",
                format_args!("[{}]", user.initials()).cyan(),
                user.display_name().bold()
            )?;
            writeln!(out, "  {}", user.email.dimmed())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("not signed in", &err),
    }
}

/// Executes `profile`.
fn cmd_profile<S: TokenStore + 'static>(
    session: &mut BlockingAuthSession<S>,
    name: &str,
) -> io::Result<ExitCode> {
    match session.update_profile(name) {
        Ok(user) => {
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Profile updated:".green().bold(),
                user.display_name()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("profile update failed", &err),
    }
}

/// Executes `change-password`.
fn cmd_change_password<S: TokenStore + 'static>(
    session: &BlockingAuthSession<S>,
) -> io::Result<ExitCode> {
    let current = read_password(None, "Current password", false)?;
    let new = read_password(None, "New password", true)?;
    match session.change_password(&current, &new) {
        Ok(()) => {
            writeln!(io::stdout().lock(), "{}", "Password changed.".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("password change failed", &err),
    }
}

// ── Dashboard and chart ──────────────────────────────────────────────

/// Executes `dashboard`: monthly summaries plus recent transactions.
fn cmd_dashboard(client: &FinanceBlockingClient) -> io::Result<ExitCode> {
    let spinner = make_spinner("Loading dashboard...");
    let result = client
        .dashboard_summary()
        .and_then(|summary| Ok((summary, client.dashboard_transactions()?)));
    spinner.finish_and_clear();
    match result {
        Ok((summary, recent)) => {
            print_dashboard(&summary)?;
            writeln!(io::stdout().lock())?;
            print_transactions_table(&recent, "Recent transactions")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("failed to load dashboard", &err),
    }
}

/// Executes `chart`.
fn cmd_chart(client: &FinanceBlockingClient, range: TimeRange) -> io::Result<ExitCode> {
    let spinner = make_spinner("Loading transactions...");
    let result = client.transactions(&TransactionQuery::all());
    spinner.finish_and_clear();
    match result {
        Ok(page) => {
            let series = cumulative_series(&page.content, range, Local::now().date_naive());
            print_chart(&series, range)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("failed to load transactions", &err),
    }
}

// ── Accounts ─────────────────────────────────────────────────────────

/// Executes an `accounts` subcommand.
fn cmd_accounts(
    client: &FinanceBlockingClient,
    command: AccountCommand,
    confirm: &mut dyn Confirm,
) -> io::Result<ExitCode> {
    match command {
        AccountCommand::List => match client.accounts() {
            Ok(accounts) => {
                print_accounts_table(&accounts)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => report("failed to read accounts", &err),
        },
        AccountCommand::Add {
            name,
            initial_balance,
        } => match client.create_account(&AccountInput::new(name, initial_balance)) {
            Ok(account) => created("account", account.id, &account.name),
            Err(err) => report("failed to create account", &err),
        },
        AccountCommand::Edit {
            id,
            name,
            initial_balance,
        } => {
            let accounts = match client.accounts() {
                Ok(accounts) => accounts,
                Err(err) => return report("failed to read accounts", &err),
            };
            let Some(current) = accounts.into_iter().find(|acc| acc.id == id) else {
                return not_found("account", id);
            };
            let input = AccountInput::new(
                name.unwrap_or(current.name),
                initial_balance.unwrap_or(current.initial_balance),
            );
            match client.update_account(id, &input) {
                Ok(account) => updated("account", account.id, &account.name),
                Err(err) => report("failed to update account", &err),
            }
        }
        AccountCommand::Delete { id } => delete_records::<Account>(client, &[id], confirm),
    }
}

// ── Categories ───────────────────────────────────────────────────────

/// Executes a `categories` subcommand.
fn cmd_categories(
    client: &FinanceBlockingClient,
    command: CategoryCommand,
    confirm: &mut dyn Confirm,
) -> io::Result<ExitCode> {
    match command {
        CategoryCommand::List => match client.categories() {
            Ok(categories) => {
                print_categories_table(&categories)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => report("failed to read categories", &err),
        },
        CategoryCommand::Add { name } => match client.create_category(&CategoryInput::new(name)) {
            Ok(category) => created("category", category.id, &category.name),
            Err(err) => report("failed to create category", &err),
        },
        CategoryCommand::Edit { id, name } => {
            match client.update_category(id, &CategoryInput::new(name)) {
                Ok(category) => updated("category", category.id, &category.name),
                Err(err) => report("failed to rename category", &err),
            }
        }
        CategoryCommand::Delete { id } => delete_records::<Category>(client, &[id], confirm),
        CategoryCommand::DeleteMany { ids } => delete_records::<Category>(client, &ids, confirm),
    }
}

// ── Transactions ─────────────────────────────────────────────────────

/// Builds the list query for one page of filtered transactions.
fn transaction_query(filters: &TransactionFilterArgs, paging: &PageArgs) -> TransactionQuery {
    let mut query = TransactionQuery::paged(paging.size).with_filters(filters.to_filters());
    if let Some(pagination) = query.pagination_mut() {
        pagination.page = paging.page.saturating_sub(1);
    }
    query
}

/// Executes a `transactions` subcommand.
fn cmd_transactions(
    client: &FinanceBlockingClient,
    command: TransactionCommand,
    confirm: &mut dyn Confirm,
) -> io::Result<ExitCode> {
    match command {
        TransactionCommand::List { filters, paging } => {
            let query = transaction_query(&filters, &paging);
            let spinner = make_spinner("Loading transactions...");
            let result = client.transactions(&query);
            spinner.finish_and_clear();
            match result {
                Ok(page) => {
                    print_transactions_table(&page.content, "Transactions")?;
                    print_page_footer(&page)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => report("failed to read transactions", &err),
            }
        }
        TransactionCommand::Add(form) => {
            let mut draft = TransactionDraft::new(form.kind.unwrap_or(TransactionType::Expense));
            draft.creation_date = Some(Local::now().date_naive());
            form.apply(&mut draft);
            let input = match draft.validate() {
                Ok(input) => input,
                Err(err) => return report("invalid transaction", &err),
            };
            match client.create_transaction(&input) {
                Ok(tx) => created("transaction", tx.id, &tx.name),
                Err(err) => report("failed to create transaction", &err),
            }
        }
        TransactionCommand::Edit { id, form } => cmd_edit_transaction(client, id, &form),
        TransactionCommand::Delete { id } => delete_records::<Transaction>(client, &[id], confirm),
        TransactionCommand::DeleteMany { ids } => {
            delete_records::<Transaction>(client, &ids, confirm)
        }
        TransactionCommand::Export { filters, output } => {
            cmd_export(client, &filters.to_filters(), &output)
        }
        TransactionCommand::Import { file } => cmd_import(client, &file),
    }
}

/// Executes `transactions edit`: merges the given fields onto the stored
/// transaction and validates the result before sending it.
fn cmd_edit_transaction(
    client: &FinanceBlockingClient,
    id: TransactionId,
    form: &TransactionFormArgs,
) -> io::Result<ExitCode> {
    let page = match client.transactions(&TransactionQuery::all()) {
        Ok(page) => page,
        Err(err) => return report("failed to read transactions", &err),
    };
    let Some(current) = page.content.iter().find(|tx| tx.id == id) else {
        return not_found("transaction", id);
    };
    let mut draft = TransactionDraft::from_transaction(current);
    form.apply(&mut draft);
    if draft.transaction_type != current.transaction_type {
        // References that the new type does not use must not be sent.
        if !draft.transaction_type.requires_out_account() && form.from_account.is_none() {
            draft.out_account = None;
        }
        if !draft.transaction_type.requires_in_account() && form.to_account.is_none() {
            draft.in_account = None;
        }
        if draft.transaction_type != TransactionType::CreditCard && form.installments.is_none() {
            draft.total_installments = None;
        }
    }
    let input = match draft.validate() {
        Ok(input) => input,
        Err(err) => return report("invalid transaction", &err),
    };
    match client.update_transaction(id, &input) {
        Ok(tx) => updated("transaction", tx.id, &tx.name),
        Err(err) => report("failed to update transaction", &err),
    }
}

/// Executes `transactions export`.
fn cmd_export(
    client: &FinanceBlockingClient,
    filters: &TransactionFilters,
    output: &Path,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Exporting transactions...");
    let result = client.export_transactions(filters);
    spinner.finish_and_clear();
    match result {
        Ok(bytes) => {
            fs::write(output, &bytes)?;
            writeln!(
                io::stdout().lock(),
                "{} {} {}",
                "Exported to".green().bold(),
                output.display(),
                format_args!("({} bytes)", bytes.len()).dimmed()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("export failed", &err),
    }
}

/// Executes `transactions import`.
fn cmd_import(client: &FinanceBlockingClient, file: &Path) -> io::Result<ExitCode> {
    let contents = match fs::read(file) {
        Ok(contents) => contents,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} cannot read {}: {err}",
                "error:".red().bold(),
                file.display()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let file_name = file
        .file_name()
        .map_or_else(|| "transactions.xlsx".to_owned(), |name| name.to_string_lossy().into_owned());

    let spinner = make_spinner("Importing transactions...");
    let result = client.import_transactions(&file_name, contents);
    spinner.finish_and_clear();
    match result {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} {file_name}",
                "Imported".green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("import failed", &err),
    }
}

// ── Planning ─────────────────────────────────────────────────────────

/// Executes a `planning` subcommand.
fn cmd_planning(
    client: &FinanceBlockingClient,
    command: PlanningCommand,
    confirm: &mut dyn Confirm,
) -> io::Result<ExitCode> {
    match command {
        PlanningCommand::List {
            month,
            year,
            category,
            paging,
        } => {
            let mut query = PlanningQuery::paged(paging.size).with_filters(PlanningFilters {
                month,
                year,
                category_id: category,
            });
            if let Some(pagination) = query.pagination_mut() {
                pagination.page = paging.page.saturating_sub(1);
            }
            match client.planning(&query) {
                Ok(page) => {
                    print_planning_table(&page.content)?;
                    print_page_footer(&page)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => report("failed to read planning", &err),
            }
        }
        PlanningCommand::Add {
            month,
            year,
            amount,
            category,
        } => {
            let input = PlanningInput {
                month,
                year,
                category,
                estimated_amount: amount,
            };
            match client.create_planning(&input) {
                Ok(entry) => created("planning entry", entry.id, &month_label(&entry)),
                Err(err) => report("failed to create planning entry", &err),
            }
        }
        PlanningCommand::Edit {
            id,
            month,
            year,
            amount,
            category,
        } => {
            let current = match client.planning_entry(id) {
                Ok(entry) => entry,
                Err(err) => return report("failed to read planning entry", &err),
            };
            let input = PlanningInput {
                month: month.unwrap_or(current.month),
                year: year.unwrap_or(current.year),
                category: category.or_else(|| current.category.as_ref().map(|cat| cat.id)),
                estimated_amount: amount.unwrap_or(current.estimated_amount),
            };
            match client.update_planning(id, &input) {
                Ok(entry) => updated("planning entry", entry.id, &month_label(&entry)),
                Err(err) => report("failed to update planning entry", &err),
            }
        }
        PlanningCommand::Delete { id } => delete_records::<PlanningEntry>(client, &[id], confirm),
        PlanningCommand::DeleteMany { ids } => {
            delete_records::<PlanningEntry>(client, &ids, confirm)
        }
    }
}

// ── Shared helpers ───────────────────────────────────────────────────

/// Deletes one or several records after confirmation.
fn delete_records<R: Resource>(
    client: &FinanceBlockingClient,
    ids: &[R::Id],
    confirm: &mut dyn Confirm,
) -> io::Result<ExitCode> {
    let mut collection = BlockingCollection::<R>::new();
    let result = match *ids {
        [id] => collection.delete(client, id, confirm),
        _ => collection.delete_many(client, ids, confirm),
    };
    match result {
        Ok(DeleteOutcome::Deleted) => {
            let noun = if ids.len() == 1 {
                R::NAME.to_owned()
            } else {
                format!("{} items", ids.len())
            };
            writeln!(io::stdout().lock(), "{} {noun}", "Deleted".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(DeleteOutcome::Cancelled) => {
            writeln!(io::stdout().lock(), "{}", "Cancelled.".dimmed())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report(&format!("failed to delete {}", R::NAME), &err),
    }
}

/// Prints an `error:` line for `err` and returns the failure exit code.
fn report(context: &str, err: &FinanceError) -> io::Result<ExitCode> {
    let mut stderr = io::stderr().lock();
    writeln!(
        stderr,
        "{} {context}: {}",
        "error:".red().bold(),
        err.user_message()
    )?;
    for field_error in err.field_errors() {
        writeln!(
            stderr,
            "  {} {}",
            format_args!("{}:", field_error.field.as_str()).yellow(),
            field_error.message
        )?;
    }
    if matches!(*err, FinanceError::Unauthenticated) || err.is_unauthorized() {
        writeln!(stderr, "  {} run `fintrack login`", "hint:".cyan())?;
    }
    Ok(ExitCode::FAILURE)
}

/// Reports a missing record.
fn not_found<I: core::fmt::Display>(what: &str, id: I) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {what} {id} not found",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Confirms a create.
fn created<I: core::fmt::Display>(what: &str, id: I, label: &str) -> io::Result<ExitCode> {
    writeln!(
        io::stdout().lock(),
        "{} {what} {} {label}",
        "Created".green().bold(),
        format_args!("#{id}").dimmed()
    )?;
    Ok(ExitCode::SUCCESS)
}

/// Confirms an update.
fn updated<I: core::fmt::Display>(what: &str, id: I, label: &str) -> io::Result<ExitCode> {
    writeln!(
        io::stdout().lock(),
        "{} {what} {} {label}",
        "Updated".green().bold(),
        format_args!("#{id}").dimmed()
    )?;
    Ok(ExitCode::SUCCESS)
}

/// `março de 2025`-style label of a planning entry's month.
fn month_label(entry: &PlanningEntry) -> String {
    month_name_pt(entry.month).map_or_else(
        || entry.year_month(),
        |name| format!("{name} de {}", entry.year),
    )
}

// ── Output formatting ────────────────────────────────────────────────

/// Table cell for a signed amount: red below zero.
fn money_cell(amount: Decimal) -> Cell {
    if amount.is_sign_negative() && !amount.is_zero() {
        Cell::new(brl(amount)).fg(Color::Red)
    } else {
        Cell::new(brl(amount))
    }
}

/// Colour used for a transaction type.
const fn type_color(kind: TransactionType) -> Color {
    match kind {
        TransactionType::Income => Color::Green,
        TransactionType::Expense | TransactionType::CreditCard => Color::Red,
        TransactionType::Transfer => Color::Blue,
    }
}

/// Prints accounts in a table.
fn print_accounts_table(accounts: &[Account]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if accounts.is_empty() {
        writeln!(out, "{}", "No accounts found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Opening balance").fg(Color::Cyan),
        Cell::new("Balance").fg(Color::Cyan),
    ]);

    for acc in accounts {
        _ = table.add_row(vec![
            Cell::new(acc.id),
            Cell::new(&acc.name),
            money_cell(acc.initial_balance),
            money_cell(acc.balance()),
        ]);
    }

    let total: Decimal = accounts.iter().map(Account::balance).sum();
    writeln!(
        out,
        "{} {}",
        "Accounts".green().bold(),
        format_args!("({}, total {})", accounts.len(), brl(total)).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints categories in a table.
fn print_categories_table(categories: &[Category]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if categories.is_empty() {
        writeln!(out, "{}", "No categories found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
    ]);
    for cat in categories {
        _ = table.add_row(vec![Cell::new(cat.id), Cell::new(&cat.name)]);
    }

    writeln!(
        out,
        "{} {}",
        "Categories".green().bold(),
        format_args!("({})", categories.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints transactions in a table under `title`.
fn print_transactions_table(txs: &[Transaction], title: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if txs.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Account").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
    ]);

    for tx in txs {
        let category = tx
            .category
            .as_ref()
            .map_or("\u{2014}", |cat| cat.name.as_str());
        let kind = match tx.total_installments {
            Some(count) if tx.transaction_type == TransactionType::CreditCard => {
                format!("{} ({count}x)", tx.transaction_type.label())
            }
            Some(_) | None => tx.transaction_type.label().to_owned(),
        };
        _ = table.add_row(vec![
            Cell::new(tx.id),
            Cell::new(date_br(tx.creation_date)),
            Cell::new(&tx.name),
            Cell::new(kind).fg(type_color(tx.transaction_type)),
            Cell::new(category),
            Cell::new(tx.account_name().unwrap_or("\u{2014}")),
            Cell::new(brl(tx.amount)).fg(type_color(tx.transaction_type)),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        title.green().bold(),
        format_args!("({})", txs.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints planning entries in a table.
fn print_planning_table(entries: &[PlanningEntry]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if entries.is_empty() {
        writeln!(out, "{}", "No planning entries found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Month").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Planned").fg(Color::Cyan),
        Cell::new("Spent").fg(Color::Cyan),
        Cell::new("Remaining").fg(Color::Cyan),
    ]);

    for entry in entries {
        let category = entry
            .category
            .as_ref()
            .map_or("\u{2014}", |cat| cat.name.as_str());
        let spent = entry
            .spent_amount
            .map_or_else(|| Cell::new("\u{2014}").fg(Color::DarkGrey), |amount| Cell::new(brl(amount)));
        let remaining = if entry.is_over_budget() {
            Cell::new(brl(entry.remaining())).fg(Color::Red)
        } else {
            Cell::new(brl(entry.remaining())).fg(Color::Green)
        };
        _ = table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(month_label(entry)),
            Cell::new(category),
            Cell::new(brl(entry.estimated_amount)),
            spent,
            remaining,
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Monthly planning".green().bold(),
        format_args!("({})", entries.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the paging line under a list.
fn print_page_footer<T>(page: &Page<T>) -> io::Result<()> {
    if page.total_pages <= 1 {
        return Ok(());
    }
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{}",
        format_args!(
            "Page {} of {} ({} items)",
            page.number.saturating_add(1),
            page.total_pages,
            page.total_elements
        )
        .dimmed()
    )?;
    if !page.last {
        writeln!(
            out,
            "  {} --page {}",
            "next:".cyan(),
            page.number.saturating_add(2)
        )?;
    }
    Ok(())
}

/// Prints the dashboard month summaries.
fn print_dashboard(summary: &DashboardSummary) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut months = summary.months().peekable();
    if months.peek().is_none() {
        writeln!(out, "{}", "No dashboard data yet.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Month").fg(Color::Cyan),
        Cell::new("Income").fg(Color::Cyan),
        Cell::new("Spent").fg(Color::Cyan),
        Cell::new("Balance").fg(Color::Cyan),
        Cell::new("Planned").fg(Color::Cyan),
        Cell::new("Left to spend").fg(Color::Cyan),
    ]);

    for (label, month) in months {
        let title = Cell::new(format!("{} ({label})", month.title));
        let title_cell = if label == "current" {
            title.fg(Color::Yellow)
        } else {
            title
        };
        _ = table.add_row(vec![
            title_cell,
            Cell::new(brl(month.total_income)).fg(Color::Green),
            Cell::new(brl(month.total_spent)).fg(Color::Red),
            money_cell(month.balance()),
            Cell::new(brl(month.planned_budget)),
            money_cell(month.remaining_budget()),
        ]);
    }

    writeln!(out, "{}", "Dashboard".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the cumulative series.
fn print_chart(series: &[ChartPoint], range: TimeRange) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if series.is_empty() {
        writeln!(out, "{}", "No transactions in this period.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Income").fg(Color::Cyan),
        Cell::new("Expense").fg(Color::Cyan),
        Cell::new("Transfer").fg(Color::Cyan),
    ]);
    for point in series {
        _ = table.add_row(vec![
            Cell::new(date_br(point.date)),
            Cell::new(brl(point.income)).fg(Color::Green),
            Cell::new(brl(point.expense)).fg(Color::Red),
            Cell::new(brl(point.transfer)).fg(Color::Blue),
        ]);
    }

    let labels: Vec<String> = TimeRange::ALL
        .iter()
        .map(|&candidate| {
            if candidate == range {
                format!("[{candidate}]")
            } else {
                candidate.to_string()
            }
        })
        .collect();
    writeln!(
        out,
        "{} {}",
        "Cumulative totals".green().bold(),
        labels.join(" ").dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
