use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;

use raspou_client::models::users::{Session, SessionHandle, Theme};
use raspou_client::platform::{TerminalClipboard, TerminalNavigator};
use raspou_client::repositories::{
    deliveries::DeliveryRepository, referrals::ReferralRepository, users::UserRepository, ApiClient,
};
use raspou_client::services::account::{PasswordField, ProfileField, SettingsViewModel};
use raspou_client::services::deliveries::{DeliveriesViewModel, DeliveryFilter};
use raspou_client::services::referrals::{ReferralViewModel, ShareChannel};
use raspou_client::settings::Settings;
use raspou_client::utils::utc_offset;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    config: Option<String>,
    #[arg(long, default_value = "log4rs.yaml")]
    log4rs: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show referral earnings and referred friends
    Referrals,
    /// Copy the referral code or link
    Copy {
        #[arg(long)]
        link: bool,
    },
    /// Open the share page of a messaging app
    Share {
        #[arg(value_enum)]
        channel: ShareChannel,
    },
    /// List prize deliveries
    Deliveries {
        #[arg(short, long, value_enum, default_value_t = DeliveryFilter::All)]
        filter: DeliveryFilter,
    },
    /// Update name and e-mail
    Profile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Change the account password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Change the interface theme
    Theme {
        #[arg(value_enum)]
        theme: ThemeArg,
    },
    /// End the current session
    Logout {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
    System,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
            ThemeArg::System => Theme::System,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| Settings::default_path().to_string_lossy().into_owned());
    let settings = Settings::load(&config_path).expect("Failed to load settings.");

    init_logging(&args.log4rs).expect("Failed to initialize logging.");
    log::info!("Using API at {}", settings.api.base_url);

    let session = SessionHandle::new(Session::new(settings.session.token.clone(), None));
    let api = ApiClient::new(&settings.api.base_url, settings.api.timeout(), session.clone())?;
    let offset = utc_offset(settings.locale.utc_offset_minutes);

    match args.command {
        Command::Referrals => {
            let mut vm = ReferralViewModel::new(
                ReferralRepository::new(api),
                TerminalClipboard,
                TerminalNavigator,
                offset,
            );
            vm.load().await;

            let cards = vm.cards();
            println!("Total de Ganhos:   {}", cards.total_earnings);
            println!("Amigos Indicados:  {}", cards.total_referred);
            println!("Amigos Ativos:     {}", cards.active_referred);
            println!("Código:            {}", vm.referral_code());
            println!("Link:              {}", vm.referral_link());

            for row in vm.referred_users() {
                println!(
                    "  {} - Indicado em: {} - {} {}",
                    row.name,
                    row.date_referred,
                    row.status,
                    row.bonus.unwrap_or_default()
                );
            }
        }
        Command::Copy { link } => {
            let mut vm = ReferralViewModel::new(
                ReferralRepository::new(api),
                TerminalClipboard,
                TerminalNavigator,
                offset,
            );
            vm.load().await;

            let copied = if link { vm.copy_link()? } else { vm.copy_code()? };
            if vm.is_copied() {
                println!("✅ Copiado com sucesso!");
            } else if !copied {
                println!("Nada para copiar.");
            }
        }
        Command::Share { channel } => {
            let mut vm = ReferralViewModel::new(
                ReferralRepository::new(api),
                TerminalClipboard,
                TerminalNavigator,
                offset,
            );
            vm.load().await;
            vm.share_via(channel)?;
        }
        Command::Deliveries { filter } => {
            let mut vm = DeliveriesViewModel::new(DeliveryRepository::new(api), offset);
            vm.load().await;
            vm.select_filter(filter);

            let buttons: Vec<String> = DeliveryFilter::ALL
                .iter()
                .map(|f| vm.filter_button(*f))
                .collect();
            println!("{}", buttons.join("  "));

            let visible = vm.visible();
            if visible.is_empty() {
                println!("Nenhuma entrega encontrada. {}", vm.empty_message());
            }

            for delivery in visible {
                let badge = delivery.status.badge();
                println!(
                    "{} {} [{} {}]",
                    delivery.product.icon(),
                    delivery.product.name,
                    badge.icon,
                    badge.label
                );
                for (label, date) in vm.timeline(delivery) {
                    println!("    {}: {}", label, date);
                }
                if let Some(code) = &delivery.tracking_code {
                    println!("    Código de rastreamento: {}", code);
                }
                if delivery.is_trackable() {
                    println!("    🔍 Rastreamento disponível");
                }
                if let Some(address) = &delivery.address {
                    for line in address.lines() {
                        println!("    {}", line);
                    }
                }
            }
        }
        Command::Profile { name, email } => {
            let mut vm = SettingsViewModel::new(
                UserRepository::new(api),
                session,
                settings.appearance.prefers_dark,
            );
            vm.set_profile_field(ProfileField::Name, &name);
            vm.set_profile_field(ProfileField::Email, &email);

            let _ = vm.submit_profile().await;
            print_feedback(vm.message(), vm.error());
        }
        Command::Password {
            current,
            new,
            confirm,
        } => {
            let mut vm = SettingsViewModel::new(
                UserRepository::new(api),
                session,
                settings.appearance.prefers_dark,
            );
            vm.set_password_field(PasswordField::Current, &current);
            vm.set_password_field(PasswordField::New, &new);
            vm.set_password_field(PasswordField::Confirm, &confirm);

            let _ = vm.submit_password().await;
            print_feedback(vm.message(), vm.error());
        }
        Command::Theme { theme } => {
            let mut vm = SettingsViewModel::new(
                UserRepository::new(api),
                session,
                settings.appearance.prefers_dark,
            );

            if let Ok(dark) = vm.change_theme(theme.into()).await {
                log::info!("Dark appearance: {}", dark);
            }
            print_feedback(vm.message(), vm.error());
        }
        Command::Logout { yes } => {
            let mut vm = SettingsViewModel::new(
                UserRepository::new(api),
                session,
                settings.appearance.prefers_dark,
            );

            // The token lives in the config file, so only this run forgets it.
            if vm.logout(yes) {
                println!("Sessão encerrada nesta execução.");
                println!(
                    "Para sair definitivamente, remova o token da seção [session] de {}.",
                    config_path
                );
            } else {
                println!("Use --yes para confirmar a saída da conta.");
            }
        }
    }

    Ok(())
}

fn print_feedback(message: Option<&str>, error: Option<&str>) {
    if let Some(message) = message {
        println!("✅ {}", message);
    }
    if let Some(error) = error {
        println!("❌ {}", error);
    }
}

fn init_logging(path: &str) -> Result<(), anyhow::Error> {
    if !Path::new("logs").exists() {
        fs::create_dir("logs")?;
    }

    match log4rs::init_file(path, Default::default()) {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("[ERROR] Failed to initialize logging: {}", e);
            Err(anyhow::anyhow!("Could not initialize logging: {}", e))
        }
    }
}
