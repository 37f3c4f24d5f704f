use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use classadmin_config::load as load_config;
use classadmin_directory::{
    filter_groups, ClassAdminSession, FetchNetworkOptions, GroupType, SortColumn, User, UserType,
};
use classadmin_runtime::{telemetry, AdminServices};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "classadmin")]
#[command(about = "School directory class administration (console by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the operator's schools and classrooms
    Network {
        /// Also load each school's classes and users
        #[arg(long)]
        with_schools: bool,
    },
    /// List the users of a classroom
    Class {
        class_id: String,
        #[arg(long, default_value = "student", value_parser = parse_user_type)]
        tab: UserType,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "name", value_parser = parse_sort_column)]
        sort: SortColumn,
        #[arg(long)]
        desc: bool,
    },
    /// Open a classroom and remember it as the preferred one
    Select { class_id: String },
    /// Block (or unblock) accounts of a classroom
    Block {
        class_id: String,
        #[arg(required = true)]
        user_ids: Vec<String>,
        #[arg(long)]
        unblock: bool,
    },
    /// Send password resets for accounts of a classroom to the operator's email
    ResetPassword {
        class_id: String,
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
    /// Delete accounts of a classroom
    Remove {
        class_id: String,
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
    /// Import a CSV file of accounts into a classroom
    Import {
        file: PathBuf,
        #[arg(long = "class")]
        class_id: String,
        #[arg(long = "type", value_parser = parse_user_type)]
        user_type: UserType,
    },
    /// Show the administrative record of a user
    User {
        user_id: String,
        #[arg(long, value_parser = parse_group_type)]
        groups: Option<GroupType>,
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Start interactive console (default)
    Console,
}

fn parse_user_type(value: &str) -> Result<UserType, String> {
    UserType::parse(value).ok_or_else(|| format!("unknown user type: {value}"))
}

fn parse_sort_column(value: &str) -> Result<SortColumn, String> {
    SortColumn::parse(value).ok_or_else(|| format!("unknown sort column: {value}"))
}

fn parse_group_type(value: &str) -> Result<GroupType, String> {
    GroupType::from_route_param(value).ok_or_else(|| format!("unknown group type: {value}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;
    let services =
        AdminServices::initialise(&config).context("failed to initialise admin services")?;

    match cli.command.unwrap_or(Commands::Console) {
        Commands::Network { with_schools } => print_network(&services, with_schools).await,
        Commands::Class {
            class_id,
            tab,
            search,
            sort,
            desc,
        } => {
            let mut session = open_class(&services, &class_id).await?;
            session.select_tab(tab);
            session.set_search(search);
            if desc {
                session.sort_desc(sort);
            } else {
                session.sort_asc(sort);
            }
            print_users(&session);
            Ok(())
        }
        Commands::Select { class_id } => {
            let mut session = services.session();
            session
                .select_classroom(&class_id)
                .await
                .with_context(|| format!("failed to select class {class_id}"))?;
            if let Some(classroom) = session.current_class() {
                println!("Selected {} ({} users)", classroom.name, classroom.users.len());
            }
            Ok(())
        }
        Commands::Block {
            class_id,
            user_ids,
            unblock,
        } => {
            let mut session = open_class(&services, &class_id).await?;
            select_users(&mut session, &user_ids)?;
            session
                .block_selection(!unblock)
                .await
                .context("failed to update blocked state")?;
            let verb = if unblock { "Unblocked" } else { "Blocked" };
            println!("{verb} {} account(s)", user_ids.len());
            Ok(())
        }
        Commands::ResetPassword { class_id, user_ids } => {
            let mut session = open_class(&services, &class_id).await?;
            select_users(&mut session, &user_ids)?;
            let sent = session
                .reset_selection_passwords()
                .await
                .context("failed to send password resets")?;
            println!("Sent {sent} password reset(s)");
            Ok(())
        }
        Commands::Remove { class_id, user_ids } => {
            let mut session = open_class(&services, &class_id).await?;
            select_users(&mut session, &user_ids)?;
            let removed = session
                .remove_selection()
                .await
                .context("failed to remove accounts")?;
            println!("Removed {} account(s)", removed.len());
            Ok(())
        }
        Commands::Import {
            file,
            class_id,
            user_type,
        } => {
            let contents = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "import.csv".to_string());

            let mut session = open_class(&services, &class_id).await?;
            session
                .import_file(file_name, contents, user_type)
                .await
                .context("failed to reload class after import")?;
            session.select_tab(user_type);
            print_users(&session);
            Ok(())
        }
        Commands::User {
            user_id,
            groups,
            filter,
        } => print_user_details(&services, &user_id, groups, &filter).await,
        Commands::Console => run_console(&services).await,
    }
}

/// Load `class_id` into a fresh session without touching the stored preference.
async fn open_class(services: &AdminServices, class_id: &str) -> anyhow::Result<ClassAdminSession> {
    let mut session = services.session();
    session
        .open_classroom(class_id)
        .await
        .with_context(|| format!("failed to open class {class_id}"))?;
    Ok(session)
}

/// Tick `user_ids` in the current class; unknown ids are an error.
fn select_users(session: &mut ClassAdminSession, user_ids: &[String]) -> anyhow::Result<()> {
    session.switch_all(Some(false));
    for user_id in user_ids {
        if session.toggle_user(user_id).is_none() {
            bail!("user {user_id} is not in this class");
        }
    }
    Ok(())
}

async fn print_network(services: &AdminServices, with_schools: bool) -> anyhow::Result<()> {
    let network = services
        .directory
        .fetch_network(FetchNetworkOptions { with_schools })
        .await
        .context("failed to fetch network")?;

    if network.schools.is_empty() {
        println!("No schools found");
        return Ok(());
    }

    for school in &network.schools {
        println!("{} ({})", school.name, school.id);
        for parent in network.parents_of(school) {
            println!("  parent: {}", parent.name);
        }
        for classroom in &school.classrooms {
            println!(
                "  - {:<30} {:<12} {} users",
                classroom.name,
                classroom.id,
                classroom.users.len()
            );
        }
    }
    Ok(())
}

fn print_users(session: &ClassAdminSession) {
    let Some(classroom) = session.current_class() else {
        println!("No class selected");
        return;
    };

    let users = session.visible_users();
    println!(
        "{} - {} ({} shown)",
        classroom.name,
        session.user_list().selected_tab(),
        users.len()
    );
    println!("{:<12} {:<30} {:<20} {:<12} {}", "ID", "Name", "Login", "Born", "Code");
    println!("{}", "-".repeat(90));
    for user in users {
        print_user_row(session, user);
    }
}

fn print_user_row(session: &ClassAdminSession, user: &User) {
    let marker = if user.selected { "*" } else { " " };
    println!(
        "{marker}{:<11} {:<30} {:<20} {:<12} {}",
        user.id,
        user.safe_display_name(),
        user.login.as_deref().unwrap_or(""),
        user.short_birth_date(),
        session
            .user_list()
            .display_code(user, session.translator())
    );
}

async fn print_user_details(
    services: &AdminServices,
    user_id: &str,
    groups: Option<GroupType>,
    filter: &str,
) -> anyhow::Result<()> {
    let details = services
        .directory
        .fetch_user_details(user_id)
        .await
        .with_context(|| format!("failed to fetch user {user_id}"))?;

    println!("{} ({})", details.display_name.as_deref().unwrap_or(""), details.id);
    println!("  login:   {}", details.login.as_deref().unwrap_or(""));
    println!("  email:   {}", details.email.as_deref().unwrap_or(""));
    println!("  mobile:  {}", details.mobile.as_deref().unwrap_or(""));
    println!("  blocked: {}", details.blocked);
    if let Some(code) = &details.activation_code {
        println!("  activation code: {code}");
    }
    for function in &details.functions {
        println!(
            "  function {}: {}",
            function.code,
            function.scope.as_deref().unwrap_or_default().join(", ")
        );
    }

    if let Some(group_type) = groups {
        let all = details.groups();
        let matching = filter_groups(&all, group_type, filter);
        println!("  {} groups ({}):", group_type.as_str(), matching.len());
        for group in matching {
            println!("    {} ({}) {} member(s)", group.name, group.id, group.users.len());
        }
    }
    Ok(())
}

async fn run_console(services: &AdminServices) -> anyhow::Result<()> {
    info!("starting interactive console");

    let mut session = services.session();
    match session.init().await.context("failed to initialise session")? {
        Some(class_id) => println!("Opened class {class_id}"),
        None => println!("No class available for this operator"),
    }

    println!("Class Admin Interactive Console");
    println!("Type commands like '/help', '/classes', '/list', '/quit'");
    println!("---");

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout())?;

        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let argument = words.collect::<Vec<_>>().join(" ");

        if matches!(command, "/quit" | "/exit" | "/q") {
            println!("Goodbye!");
            break;
        }
        if let Err(error) = run_console_command(&mut session, command, &argument).await {
            println!("error: {error:#}");
        }
    }

    Ok(())
}

async fn run_console_command(
    session: &mut ClassAdminSession,
    command: &str,
    argument: &str,
) -> anyhow::Result<()> {
    match command {
        "/help" | "/h" => {
            println!("Available commands:");
            println!("  /classes, /c          - List the operator's classes");
            println!("  /select <class>       - Open a class");
            println!("  /tab <type>           - Show Student, Relative, Teacher or Personnel");
            println!("  /search <text>        - Filter the list by name");
            println!("  /sort <column> [desc] - Sort by name, birthdate, login or activation");
            println!("  /list, /l             - Show the current list");
            println!("  /toggle <user>        - Select or unselect a user");
            println!("  /all, /none           - Select or unselect the whole tab");
            println!("  /block, /unblock      - Block or unblock the selection");
            println!("  /reset                - Send password resets for the selection");
            println!("  /remove               - Delete the selected accounts");
            println!("  /quit, /exit, /q      - Exit console");
        }
        "/classes" | "/c" => {
            let current = session.menu().selected_class_id().map(str::to_string);
            for classroom in session.menu().classrooms() {
                let marker = if current.as_deref() == Some(classroom.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {:<12} {}", classroom.id, classroom.name);
            }
        }
        "/select" => {
            session.select_classroom(argument).await?;
            print_users(session);
        }
        "/tab" => {
            let kind = parse_user_type(argument).map_err(|message| anyhow!(message))?;
            session.select_tab(kind);
            print_users(session);
        }
        "/search" => {
            session.set_search(argument);
            print_users(session);
        }
        "/sort" => {
            let mut parts = argument.split_whitespace();
            let column = parse_sort_column(parts.next().unwrap_or("name"))
                .map_err(|message| anyhow!(message))?;
            if parts.next() == Some("desc") {
                session.sort_desc(column);
            } else {
                session.sort_asc(column);
            }
            print_users(session);
        }
        "/list" | "/l" => print_users(session),
        "/toggle" => match session.toggle_user(argument) {
            Some(selected) => println!("{argument}: {}", if selected { "selected" } else { "unselected" }),
            None => println!("No user {argument} in this class"),
        },
        "/all" => session.switch_all(Some(true)),
        "/none" => session.switch_all(Some(false)),
        "/block" | "/unblock" => {
            let value = command == "/block";
            session.block_selection(value).await?;
            print_users(session);
        }
        "/reset" => {
            let sent = session.reset_selection_passwords().await?;
            println!("Sent {sent} password reset(s)");
        }
        "/remove" => {
            let removed = session.remove_selection().await?;
            println!("Removed {} account(s)", removed.len());
        }
        _ => {
            println!("Unknown command: {command}");
            println!("Type '/help' for available commands");
        }
    }
    Ok(())
}
