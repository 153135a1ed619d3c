//! CLI do quadro de visitas
//!
//! Monta o mesmo painel usado por qualquer renderizador e o desenha no
//! terminal: colunas (tela larga) ou seções recolhíveis (tela estreita).

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;

use agenda_api::{AgendaClient, ConfirmOutcome, TokenStore, VisitId, VisitStatus, VisitasApi};
use backoffice_visitas::config::Settings;
use backoffice_visitas::session::Session;
use backoffice_visitas::utils::logging::{init_tracing, log_config_loaded};
use backoffice_visitas::visitas::{BoardView, DropOutcome, ModalHost, MonthRef, VisitBoard, VisitCard};

#[derive(Parser)]
#[command(name = "backoffice-visitas")]
#[command(version = "0.1.0")]
#[command(about = "Agenda de visitas comerciais do back-office", long_about = None)]
struct Cli {
    /// URL base da API (sobrepõe config/default.yaml)
    #[arg(long, env = "BACKOFFICE_API_URL", global = true)]
    api_url: Option<String>,

    /// Modo verbose para debug
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct MonthArgs {
    /// Ano (padrão: ano corrente)
    #[arg(long)]
    ano: Option<i32>,

    /// Mês 1-12 (padrão: mês corrente)
    #[arg(long)]
    mes: Option<u32>,
}

impl MonthArgs {
    fn resolve(&self) -> (i32, u32) {
        let current = MonthRef::current();
        (self.ano.unwrap_or(current.year), self.mes.unwrap_or(current.month))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Autentica e salva os tokens
    Login {
        #[arg(short = 'u', long)]
        usuario: String,

        #[arg(short = 'p', long, env = "BACKOFFICE_PASSWORD", hide_env_values = true)]
        senha: String,
    },

    /// Encerra a sessão e apaga os tokens
    Logout,

    /// Mostra o quadro do mês
    Quadro {
        #[command(flatten)]
        mes: MonthArgs,

        /// Filtro por empresa (substring, sem diferenciar maiúsculas)
        #[arg(short = 'f', long, default_value = "")]
        filtro: String,

        /// Largura do viewport em px (abaixo do breakpoint vira acordeão)
        #[arg(short = 'w', long)]
        largura: Option<u32>,

        /// Expande todas as seções do acordeão
        #[arg(long)]
        expandir: bool,

        /// Saída em JSON
        #[arg(long)]
        json: bool,
    },

    /// Agenda uma nova visita
    Criar {
        #[arg(short = 'e', long)]
        empresa: String,

        /// Data (aaaa-mm-dd)
        #[arg(short = 'd', long)]
        data: String,

        /// Hora (HH:MM)
        #[arg(short = 'H', long)]
        hora: String,

        #[arg(short = 'o', long)]
        obs: Option<String>,
    },

    /// Edita uma visita ainda agendada
    Editar {
        id: String,

        #[command(flatten)]
        mes: MonthArgs,

        #[arg(short = 'e', long)]
        empresa: Option<String>,

        #[arg(short = 'd', long)]
        data: Option<String>,

        #[arg(short = 'H', long)]
        hora: Option<String>,

        #[arg(short = 'o', long)]
        obs: Option<String>,
    },

    /// Cancela uma visita agendada
    Cancelar {
        id: String,

        #[command(flatten)]
        mes: MonthArgs,

        #[arg(short = 'm', long)]
        motivo: String,
    },

    /// Marca uma visita agendada como realizada
    Confirmar {
        id: String,

        #[command(flatten)]
        mes: MonthArgs,

        /// proposta_enviada | em_negociacao | sem_interesse
        #[arg(short = 'r', long, value_parser = parse_outcome, default_value = "proposta_enviada")]
        resultado: ConfirmOutcome,

        #[arg(short = 'c', long)]
        comentario: String,
    },

    /// Move o cartão para outra coluna (mesmo fluxo do arrastar-e-soltar)
    Mover {
        id: String,

        #[command(flatten)]
        mes: MonthArgs,

        /// realizada | cancelada
        #[arg(long, value_parser = parse_status)]
        para: VisitStatus,

        #[arg(short = 'm', long)]
        motivo: Option<String>,

        #[arg(short = 'r', long, value_parser = parse_outcome, default_value = "proposta_enviada")]
        resultado: ConfirmOutcome,

        #[arg(short = 'c', long)]
        comentario: Option<String>,
    },
}

fn parse_outcome(value: &str) -> Result<ConfirmOutcome, String> {
    ConfirmOutcome::parse(value).ok_or_else(|| format!("Resultado desconhecido: {}", value))
}

fn parse_status(value: &str) -> Result<VisitStatus, String> {
    VisitStatus::parse(value).ok_or_else(|| format!("Status desconhecido: {}", value))
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_tracing(if cli.verbose { "debug" } else { "warn" });

    if let Err(e) = run(cli).await {
        eprintln!("❌ Erro: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::new().context("Falha ao carregar configuração")?;
    if let Some(url) = cli.api_url {
        settings.api.base_url = url;
    }
    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into()));

    let client = AgendaClient::with_timeouts(
        settings.api.base_url.clone(),
        TokenStore::file(&settings.session.token_file),
        settings.api.timeout_secs,
        settings.api.connect_timeout_secs,
    )?;
    // login e logout não dependem de resolver a sessão atual no servidor
    match cli.command {
        Commands::Login { usuario, senha } => {
            let user = Session::new(client).login(&usuario, &senha).await?;
            println!("✅ Logado como {} ({})", user.nome_completo, user.nivel_acesso);
            Ok(())
        }
        Commands::Logout => {
            Session::new(client).teardown().await?;
            println!("✅ Sessão encerrada");
            Ok(())
        }
        command => {
            let session = Session::init(client.clone()).await?;
            let api = Arc::new(VisitasApi::with_operations(client, settings.operation_routes())?);
            let mut board = VisitBoard::with_fallback(&session, api, &settings.board).await?;
            run_board_command(&mut board, command).await
        }
    }
}

async fn run_board_command(board: &mut VisitBoard, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Quadro {
            mes,
            filtro,
            largura,
            expandir,
            json,
        } => {
            let (ano, mes) = mes.resolve();
            load(board, ano, mes, &filtro).await?;
            if let Some(width) = largura {
                board.resize(width);
            }
            if expandir {
                for status in [VisitStatus::Realizada, VisitStatus::Cancelada] {
                    if !board.presenter().is_expanded(status) {
                        board.toggle_section(status);
                    }
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&board.view())?);
            } else {
                println!(
                    "📅 Visitas {} · {} ({}){}",
                    board.period(),
                    board.usuario().nome_completo,
                    board.usuario().nivel_acesso,
                    if filtro.is_empty() {
                        String::new()
                    } else {
                        format!(" · filtro \"{}\"", filtro)
                    }
                );
                print!("{}", render_board(&board.view()));
            }
        }

        Commands::Criar {
            empresa,
            data,
            hora,
            obs,
        } => {
            let current = MonthRef::current();
            load(board, current.year, current.month, "").await?;
            board.open_create();
            if let ModalHost::CreateEdit(modal) = board.modal_mut() {
                modal.form.empresa = empresa;
                modal.form.data = data;
                modal.form.hora = hora;
                modal.form.obs = obs.unwrap_or_default();
            }
            submit(board).await?;
            println!("✅ Visita agendada");
        }

        Commands::Editar {
            id,
            mes,
            empresa,
            data,
            hora,
            obs,
        } => {
            let (ano, mes) = mes.resolve();
            load(board, ano, mes, "").await?;
            board.open_edit(&VisitId::new(id))?;
            if let ModalHost::CreateEdit(modal) = board.modal_mut() {
                if let Some(empresa) = empresa {
                    modal.form.empresa = empresa;
                }
                if let Some(data) = data {
                    modal.form.data = data;
                }
                if let Some(hora) = hora {
                    modal.form.hora = hora;
                }
                if let Some(obs) = obs {
                    modal.form.obs = obs;
                }
            }
            submit(board).await?;
            println!("✅ Visita atualizada");
        }

        Commands::Cancelar { id, mes, motivo } => {
            let (ano, mes) = mes.resolve();
            load(board, ano, mes, "").await?;
            board.open_cancel(&VisitId::new(id))?;
            fill_cancel(board, motivo);
            submit(board).await?;
            println!("✅ Visita cancelada");
        }

        Commands::Confirmar {
            id,
            mes,
            resultado,
            comentario,
        } => {
            let (ano, mes) = mes.resolve();
            load(board, ano, mes, "").await?;
            board.open_confirm(&VisitId::new(id))?;
            fill_confirm(board, resultado, comentario);
            submit(board).await?;
            println!("✅ Visita marcada como realizada");
        }

        Commands::Mover {
            id,
            mes,
            para,
            motivo,
            resultado,
            comentario,
        } => {
            let (ano, mes) = mes.resolve();
            load(board, ano, mes, "").await?;

            let id = VisitId::new(id);
            let source = board
                .presenter()
                .drag_start(&id)
                .ok_or_else(|| anyhow!("Visita {} não pode ser movida", id))?;

            match board.drop_visit(&source.drop_on(para)) {
                DropOutcome::Ignored(reason) => bail!("Movimento ignorado: {:?}", reason),
                DropOutcome::OpenCancel(_) => fill_cancel(board, motivo.unwrap_or_default()),
                DropOutcome::OpenConfirm(_) => {
                    fill_confirm(board, resultado, comentario.unwrap_or_default())
                }
            }
            submit(board).await?;
            println!("✅ Visita movida para {}", para.label());
        }

        Commands::Login { .. } | Commands::Logout => {}
    }

    Ok(())
}

async fn load(board: &mut VisitBoard, ano: i32, mes: u32, filtro: &str) -> anyhow::Result<()> {
    board.load(ano, mes, filtro).await;
    match board.banner() {
        Some(banner) => bail!("{}", banner),
        None => Ok(()),
    }
}

fn fill_cancel(board: &mut VisitBoard, motivo: String) {
    if let ModalHost::Cancel(modal) = board.modal_mut() {
        modal.motivo = motivo;
    }
}

fn fill_confirm(board: &mut VisitBoard, resultado: ConfirmOutcome, comentario: String) {
    if let ModalHost::Confirm(modal) = board.modal_mut() {
        modal.resultado = resultado;
        modal.comentario = comentario;
    }
}

/// Envia o diálogo aberto; erros de validação viram mensagem única
async fn submit(board: &mut VisitBoard) -> anyhow::Result<()> {
    if board.submit_modal().await? {
        return Ok(());
    }

    let errors: Vec<String> = match board.modal() {
        ModalHost::CreateEdit(modal) => modal
            .errors()
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect(),
        ModalHost::Cancel(modal) => modal.error().map(str::to_string).into_iter().collect(),
        ModalHost::Confirm(modal) => modal.error().map(str::to_string).into_iter().collect(),
        ModalHost::Closed => Vec::new(),
    };
    bail!("Nada foi enviado. {}", errors.join("; "))
}

fn render_card(card: &VisitCard) -> String {
    let mut line = format!("  [#{}] {} {}  {}", card.id, card.data, card.hora, card.empresa);
    if let Some(responsavel) = &card.responsavel {
        line.push_str(&format!(" (resp. {})", responsavel));
    }
    if let Some(motivo) = &card.motivo_cancelamento {
        line.push_str(&format!("\n        motivo: {}", motivo));
    }
    if let Some(obs) = &card.obs {
        line.push_str(&format!("\n        obs: {}", obs));
    }
    line.push('\n');
    line
}

fn render_board(view: &BoardView) -> String {
    let mut out = String::new();
    match view {
        BoardView::Columns(columns) => {
            for column in columns {
                let marker = if column.drop_target { " ⇣" } else { "" };
                out.push_str(&format!("\n== {} ({}){} ==\n", column.title, column.count, marker));
                if column.cards.is_empty() {
                    out.push_str("  (vazio)\n");
                }
                for card in &column.cards {
                    out.push_str(&render_card(card));
                }
            }
        }
        BoardView::Accordion(sections) => {
            for section in sections {
                let arrow = if section.expanded { "▼" } else { "▶" };
                out.push_str(&format!("\n{} {} ({})\n", arrow, section.title, section.count));
                if section.expanded {
                    for card in &section.cards {
                        out.push_str(&render_card(card));
                    }
                }
            }
        }
    }
    out
}
