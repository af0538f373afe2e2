use crate::app::{AppContext, Result};
use crate::cli::PostArgs;
use crate::domain::{CardTone, Category, Field, Post};
use crate::feed::FeedStore;
use crate::form::{format_postal_code, ComposeForm, SubmitOutcome, SubmitRejected};
use crate::form::format::is_complete_postal_code;

pub async fn show_feed(ctx: &AppContext, pages: u32, search: Option<&str>) -> Result<()> {
    let mut store = FeedStore::new().with_timeout(ctx.config.api_timeout());
    store
        .load_page(ctx.posts_api.as_ref(), &ctx.normalizer, 1)
        .await?;

    for _ in 1..pages {
        match store
            .load_next_page(ctx.posts_api.as_ref(), &ctx.normalizer)
            .await?
        {
            Some(0) | None => break,
            Some(_) => {}
        }
    }

    let posts = store.filtered(search.unwrap_or(""));
    if posts.is_empty() {
        println!("No posts");
        return Ok(());
    }

    for post in &posts {
        print_post(post);
    }
    println!(
        "{} of {} posts (pages loaded: {})",
        posts.len(),
        store.posts().len(),
        store.page()
    );
    Ok(())
}

fn print_post(post: &Post) {
    let marker = match post.card_tone() {
        CardTone::Urgent => "!",
        CardTone::Help => "+",
        CardTone::Neutral => " ",
    };
    println!(
        "{} #{} [{}] ({}) {} - {}",
        marker,
        post.id,
        post.category.label(),
        post.initials(),
        post.author,
        post.timestamp
    );
    println!("    {}", post.content);
    println!("    {} (CEP {})", post.address, post.cep);
    println!("    Tel: {} ({})", post.phone, post.whatsapp_url());
    if let Some(image) = &post.image {
        println!("    Imagem: {}", image);
    }
}

pub async fn submit_post(ctx: &AppContext, args: &PostArgs) -> Result<()> {
    let mut form = ComposeForm::new();

    form.set_field(Field::Name, &args.name);
    form.set_field(Field::Content, &args.content);
    form.set_field(Field::Category, &args.category);
    form.set_phone(&args.phone);

    if let Some(ticket) = form.set_postal_code(&args.cep) {
        if ctx.resolver.resolve_postal_code(&mut form, ticket).await {
            println!("Endereço preenchido pelo CEP: {}", form.draft().address);
        }
    }

    if args.locate {
        ctx.resolver.locate(&mut form).await;
    }

    for (field, value) in [(Field::Address, &args.address), (Field::Number, &args.number)] {
        if !value.is_empty() {
            form.set_field(field, value);
        }
    }
    for (field, value) in [
        (Field::Neighborhood, &args.neighborhood),
        (Field::City, &args.city),
        (Field::State, &args.state),
    ] {
        if let Some(value) = value {
            form.set_field(field, value);
        }
    }

    if let Some(path) = &args.image {
        form.attach_file(path).await?;
    }

    if let Some(notice) = form.notice() {
        eprintln!("{}", notice.message());
    }

    match ctx.pipeline.submit(&mut form).await {
        SubmitOutcome::Succeeded => {
            println!("Publicação enviada!");
        }
        SubmitOutcome::Failed => {
            if let Some(notice) = form.notice() {
                eprintln!("{}", notice.message());
            }
        }
        SubmitOutcome::Rejected(SubmitRejected::Invalid(errors)) => {
            eprintln!("Corrija os campos abaixo:");
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
        }
        SubmitOutcome::Rejected(other) => {
            eprintln!("{}", other);
        }
    }

    Ok(())
}

pub async fn lookup_cep(ctx: &AppContext, code: &str) -> Result<()> {
    let mut form = ComposeForm::new();
    let formatted = format_postal_code(code);
    if !is_complete_postal_code(&formatted) {
        println!("CEP incompleto: {}", formatted);
        return Ok(());
    }

    let Some(ticket) = form.set_postal_code(&formatted) else {
        return Ok(());
    };

    if ctx.resolver.resolve_postal_code(&mut form, ticket).await {
        let draft = form.draft();
        println!("CEP {}", draft.cep);
        println!("  {}", draft.address);
        println!("  {}, {} - {}", draft.neighborhood, draft.city, draft.state);
    } else {
        println!("CEP {} não encontrado", formatted);
    }
    Ok(())
}

pub fn list_categories() {
    for category in Category::SELECTABLE {
        let style = category.style();
        let urgency = if category.is_urgent() { "urgent" } else { "" };
        println!(
            "{:<12} {:<22} {:<14} {}",
            style.tag, style.form_label, style.icon, urgency
        );
    }
}
