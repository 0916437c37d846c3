use crate::discord::confirm::{confirm, Confirmation};
use crate::discord::permissions::class_overwrites;
use crate::discord::Bot;
use crate::error::{DiscordError, Result};
use crate::roster::{self, CourseRow, REQUIRED_COLUMNS};
use crate::store::ClassRecord;
use futures::future::join_all;
use rand::Rng;
use serenity::all::{
    ChannelId, ChannelType, Context, CreateChannel, CreateEmbed, CreateMessage, EditRole, GuildId,
    Member, Mentionable, Message, Permissions, RoleId,
};
use tracing::{error, info, warn};

/// Discord's message length budget; longer replies are chunked.
const MESSAGE_BUDGET: usize = 2000;

const HOTDOG_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/f/fb/Hotdog_-_Evan_Swigart.jpg/1200px-Hotdog_-_Evan_Swigart.jpg";
const SOURCE_URL: &str = "https://github.com/uaf-cs/registrar";

/// Route one prefixed message to its command handler.
pub async fn dispatch(bot: &Bot, ctx: &Context, msg: &Message) {
    let Some(rest) = msg.content.strip_prefix(bot.config.discord.prefix.as_str()) else {
        return;
    };
    let rest = rest.trim_start();
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args),
        None => (rest, ""),
    };
    let name = name.to_lowercase();

    let result = match name.as_str() {
        "createclass" => create_class(bot, ctx, msg, args).await,
        "addclasses" => add_classes(bot, ctx, msg, args).await,
        "destroyclass" | "deleteclass" => delete_class(bot, ctx, msg, args).await,
        "joinclass" => join_class(bot, ctx, msg, args).await,
        "dropclass" => drop_class(bot, ctx, msg, args).await,
        "classes" => list_classes(bot, ctx, msg).await,
        "sync" => sync_channels(bot, ctx, msg).await,
        "merge" => merge_classes(bot, ctx, msg, args).await,
        "cleanup" => cleanup_classes(bot, ctx, msg).await,
        "registersubject" => register_subject(bot, ctx, msg, args).await,
        "roll" => roll(bot, ctx, msg, args).await,
        "cat" => cat(bot, ctx, msg).await,
        "hotdog" => hotdog(ctx, msg).await,
        "insult" => insult(bot, ctx, msg, args).await,
        "source" => source(ctx, msg).await,
        _ => return,
    };

    if let Err(e) = result {
        error!(command = %name, user = %msg.author.name, "Command failed: {e:?}");
        let _ = msg
            .channel_id
            .say(
                &ctx.http,
                "Sorry, something went wrong running that command.",
            )
            .await;
    } else {
        info!(command = %name, user = %msg.author.name, "Command handled");
    }
}

async fn reply(ctx: &Context, msg: &Message, text: impl Into<String>) -> Result<()> {
    msg.channel_id
        .say(&ctx.http, text)
        .await
        .map_err(|source| DiscordError::ApiFailed {
            context: "send reply".to_string(),
            source,
        })?;
    Ok(())
}

fn is_moderator(member: &Member, bot: &Bot) -> bool {
    member.roles.contains(&RoleId::new(bot.config.roles.teacher))
        || member.roles.contains(&RoleId::new(bot.config.roles.admin))
}

/// Guild-only moderator gate. Replies and returns `None` when the caller is
/// outside the guild or lacks the teacher/admin role.
async fn require_moderator(bot: &Bot, ctx: &Context, msg: &Message) -> Result<Option<GuildId>> {
    let Some(guild_id) = msg.guild_id else {
        reply(ctx, msg, "That command only works in the server.").await?;
        return Ok(None);
    };
    let member =
        guild_id
            .member(&ctx.http, msg.author.id)
            .await
            .map_err(|source| DiscordError::ApiFailed {
                context: "fetch invoking member".to_string(),
                source,
            })?;
    if !is_moderator(&member, bot) {
        reply(ctx, msg, "You don't have permission to use this command.").await?;
        return Ok(None);
    }
    Ok(Some(guild_id))
}

/// Accepts a bare role id or a role mention like `<@&123>`.
fn parse_role_ref(arg: &str) -> Option<u64> {
    let arg = arg.trim();
    let digits = arg
        .strip_prefix("<@&")
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(arg);
    digits.parse().ok()
}

/// Pack response lines into messages that fit the Discord length budget.
fn chunk_lines<I>(lines: I, max_length: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in lines {
        if !current.is_empty() && current.len() + line.len() + 1 > max_length {
            chunks.push(std::mem::take(&mut current));
        }
        // A single line over the budget gets hard-split.
        if line.len() > max_length {
            for piece in line.chars().collect::<Vec<_>>().chunks(max_length) {
                chunks.push(piece.iter().collect());
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(&line);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

async fn send_chunked(ctx: &Context, msg: &Message, lines: Vec<String>) -> Result<()> {
    for chunk in chunk_lines(lines, MESSAGE_BUDGET) {
        reply(ctx, msg, chunk).await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Class provisioning
// ---------------------------------------------------------------------------

/// Create role, channel, and store record for one course row, undoing
/// partial work on failure. Returns the per-row outcome line.
async fn provision_class(
    bot: &Bot,
    ctx: &Context,
    guild: GuildId,
    category: ChannelId,
    row: CourseRow,
) -> String {
    let name = row.channel_name();

    let role = match guild
        .create_role(
            &ctx.http,
            EditRole::new()
                .name(row.role_name())
                .permissions(Permissions::empty()),
        )
        .await
    {
        Ok(role) => role,
        Err(e) => return format!("Error adding {name}: {e}"),
    };

    let builder = CreateChannel::new(row.channel_name())
        .kind(ChannelType::Text)
        .category(category)
        .permissions(class_overwrites(role.id, &bot.config));
    let channel = match guild.create_channel(&ctx.http, builder).await {
        Ok(channel) => channel,
        Err(e) => {
            unprovision(bot, ctx, guild, role.id, None).await;
            return format!("Error adding {name}: {e}");
        }
    };

    let record = row.into_record(channel.id.get());
    if let Err(e) = bot.store.add(role.id.get(), &record).await {
        unprovision(bot, ctx, guild, role.id, Some(channel.id)).await;
        return format!("Error adding {name}: {e}");
    }

    format!("Added {}", role.mention())
}

/// Best-effort reverse cleanup of a partially created class.
async fn unprovision(
    bot: &Bot,
    ctx: &Context,
    guild: GuildId,
    role_id: RoleId,
    channel_id: Option<ChannelId>,
) {
    if let Err(e) = bot.store.remove(role_id.get()).await {
        warn!(role = role_id.get(), "Cleanup: record removal failed: {e}");
    }
    if let Err(e) = guild.delete_role(&ctx.http, role_id).await {
        warn!(role = role_id.get(), "Cleanup: role deletion failed: {e}");
    }
    if let Some(channel) = channel_id {
        if let Err(e) = channel.delete(&ctx.http).await {
            warn!(
                channel = channel.get(),
                "Cleanup: channel deletion failed: {e}"
            );
        }
    }
}

async fn create_class(bot: &Bot, ctx: &Context, msg: &Message, args: &str) -> Result<()> {
    let Some(guild_id) = require_moderator(bot, ctx, msg).await? else {
        return Ok(());
    };

    let fields: Vec<&str> = args.split(',').map(str::trim).collect();
    if fields.len() < 4 || fields.iter().take(4).any(|f| f.is_empty()) {
        return reply(
            ctx,
            msg,
            format!(
                "Usage: {}createclass SUBJECT,COURSE,TITLE,INSTRUCTOR[,SECTION]",
                bot.config.discord.prefix
            ),
        )
        .await;
    }

    let row = CourseRow {
        subject: fields[0].to_string(),
        course: fields[1].to_string(),
        title: fields[2].to_string(),
        instructor: fields[3].to_string(),
        section: fields
            .get(4)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
    };

    let category = ChannelId::new(bot.config.discord.class_category_id);
    let outcome = provision_class(bot, ctx, guild_id, category, row).await;
    reply(ctx, msg, outcome).await
}

async fn add_classes(bot: &Bot, ctx: &Context, msg: &Message, args: &str) -> Result<()> {
    let Some(guild_id) = require_moderator(bot, ctx, msg).await? else {
        return Ok(());
    };

    let Some((first_line, body)) = args.split_once('\n') else {
        return reply(
            ctx,
            msg,
            format!(
                "Usage: {}addclasses CATEGORY_ID with the roster CSV on the following lines.\nRequired columns: {}",
                bot.config.discord.prefix,
                REQUIRED_COLUMNS.join(",")
            ),
        )
        .await;
    };

    let Ok(parent) = first_line.trim().parse::<u64>() else {
        return reply(ctx, msg, "Please provide a valid parent category ID").await;
    };
    let category = ChannelId::new(parent);
    if ctx.http.get_channel(category).await.is_err() {
        return reply(ctx, msg, "Please provide a valid parent category ID").await;
    }

    let rows = match roster::parse_roster(body.trim()) {
        Ok(rows) => rows,
        Err(e) => {
            return reply(ctx, msg, format!("Invalid CSV provided.\n{e}")).await;
        }
    };

    let typing = msg.channel_id.start_typing(&ctx.http);
    let mut responses = Vec::with_capacity(rows.len());
    for row in rows {
        let outcome = match row {
            Ok(row) => provision_class(bot, ctx, guild_id, category, row).await,
            Err(issue) => format!("Course rejected: {issue}"),
        };
        responses.push(outcome);
    }
    typing.stop();

    send_chunked(ctx, msg, responses).await
}

// ---------------------------------------------------------------------------
// Class teardown
// ---------------------------------------------------------------------------

/// Concurrently delete a class's role, channel, and store entry. Every
/// step's failure is kept and reported instead of being swallowed.
async fn teardown_class(
    bot: &Bot,
    ctx: &Context,
    guild: GuildId,
    role_id: u64,
    record: &ClassRecord,
) -> Vec<String> {
    let (role_result, channel_result, store_result) = futures::join!(
        guild.delete_role(&ctx.http, RoleId::new(role_id)),
        ChannelId::new(record.channel).delete(&ctx.http),
        bot.store.remove(role_id),
    );

    let mut failures = Vec::new();
    if let Err(e) = role_result {
        failures.push(format!("{}: role deletion failed: {e}", record.class_id()));
    }
    if let Err(e) = channel_result {
        failures.push(format!(
            "{}: channel deletion failed: {e}",
            record.class_id()
        ));
    }
    if let Err(e) = store_result {
        failures.push(format!("{}: record removal failed: {e}", record.class_id()));
    }
    for failure in &failures {
        warn!(class = role_id, "Teardown: {failure}");
    }
    failures
}

/// Teardown for an index entry whose record has gone missing: there is no
/// channel to delete, but the role and the index entry can still go.
async fn teardown_stale(bot: &Bot, ctx: &Context, guild: GuildId, role_id: u64) -> Vec<String> {
    let (role_result, store_result) = futures::join!(
        guild.delete_role(&ctx.http, RoleId::new(role_id)),
        bot.store.remove(role_id),
    );

    let mut failures = Vec::new();
    if let Err(e) = role_result {
        failures.push(format!("{role_id}: role deletion failed: {e}"));
    }
    if let Err(e) = store_result {
        failures.push(format!("{role_id}: record removal failed: {e}"));
    }
    failures
}

fn teardown_summary(done: &str, failures: Vec<String>) -> Vec<String> {
    if failures.is_empty() {
        return vec![done.to_string()];
    }
    let mut lines = vec![format!("{done} Some steps failed:")];
    for failure in failures {
        lines.push(format!("* {failure}"));
    }
    lines
}

async fn delete_class(bot: &Bot, ctx: &Context, msg: &Message, args: &str) -> Result<()> {
    let Some(guild_id) = require_moderator(bot, ctx, msg).await? else {
        return Ok(());
    };

    let Some(role_id) = parse_role_ref(args) else {
        return reply(
            ctx,
            msg,
            format!(
                "Usage: {}deleteclass CLASS_ROLE_ID",
                bot.config.discord.prefix
            ),
        )
        .await;
    };
    let Some(record) = bot.store.get(role_id).await? else {
        return reply(ctx, msg, "Class not found").await;
    };

    let expected = record.slug();
    let prompt = format!(
        "Are you sure you want to delete the {expected} course? Reply with `{expected}`"
    );
    match confirm(ctx, msg.channel_id, msg.author.id, &prompt, &expected).await? {
        Confirmation::Confirmed => {}
        Confirmation::Mismatch(_) => {
            return reply(ctx, msg, "Confirmation does not match, not deleting course.").await;
        }
        Confirmation::TimedOut => {
            return reply(ctx, msg, "Confirmation timed out, not deleting course.").await;
        }
    }

    let failures = teardown_class(bot, ctx, guild_id, role_id, &record).await;
    send_chunked(ctx, msg, teardown_summary("Class deleted.", failures)).await
}

fn merge_confirmation(from: &ClassRecord, to: &ClassRecord) -> String {
    format!("{}>{}", from.slug(), to.slug())
}

async fn merge_classes(bot: &Bot, ctx: &Context, msg: &Message, args: &str) -> Result<()> {
    let Some(guild_id) = require_moderator(bot, ctx, msg).await? else {
        return Ok(());
    };

    let ids: Vec<&str> = args.split_whitespace().collect();
    if ids.len() != 2 {
        return reply(ctx, msg, "Invalid usage.").await;
    }
    let (Some(to_id), Some(from_id)) = (parse_role_ref(ids[0]), parse_role_ref(ids[1])) else {
        return reply(ctx, msg, "Invalid usage.").await;
    };

    let Some(to) = bot.store.get(to_id).await? else {
        return reply(ctx, msg, format!("Class {} not found", ids[0])).await;
    };
    let Some(from) = bot.store.get(from_id).await? else {
        return reply(ctx, msg, format!("Class {} not found", ids[1])).await;
    };

    let expected = merge_confirmation(&from, &to);
    let prompt = format!(
        "Are you sure you want to merge {} into {}?\nReply with `{expected}` to confirm.",
        from.slug(),
        to.slug()
    );
    match confirm(ctx, msg.channel_id, msg.author.id, &prompt, &expected).await? {
        Confirmation::Confirmed => {}
        Confirmation::Mismatch(_) => {
            return reply(ctx, msg, "Confirmation does not match, not merging classes.").await;
        }
        Confirmation::TimedOut => {
            return reply(ctx, msg, "Confirmation timed out, not merging classes.").await;
        }
    }

    // Move every member of the source class onto the target role before the
    // source class goes away.
    let members = guild_id
        .members(&ctx.http, None, None)
        .await
        .map_err(|source| DiscordError::ApiFailed {
            context: "list guild members".to_string(),
            source,
        })?;
    let moves = members
        .iter()
        .filter(|member| member.roles.contains(&RoleId::new(from_id)))
        .map(|member| member.add_role(&ctx.http, RoleId::new(to_id)));
    let moved: Vec<_> = join_all(moves).await;
    let mut failures: Vec<String> = Vec::new();
    let failed_moves = moved.iter().filter(|r| r.is_err()).count();
    if failed_moves > 0 {
        failures.push(format!(
            "{failed_moves} member(s) could not be moved to {}",
            to.class_id()
        ));
    }

    failures.extend(teardown_class(bot, ctx, guild_id, from_id, &from).await);
    send_chunked(ctx, msg, teardown_summary("Classes merged.", failures)).await
}

async fn cleanup_classes(bot: &Bot, ctx: &Context, msg: &Message) -> Result<()> {
    let Some(guild_id) = require_moderator(bot, ctx, msg).await? else {
        return Ok(());
    };

    let classes = bot.store.list_records().await?;
    let expected = rand::thread_rng().gen_range(0..100_000u32).to_string();
    let prompt = format!(
        "Are you sure you want to delete all {} course channels? Reply with `{expected}`",
        classes.len()
    );
    match confirm(ctx, msg.channel_id, msg.author.id, &prompt, &expected).await? {
        Confirmation::Confirmed => {}
        Confirmation::Mismatch(_) => {
            return reply(ctx, msg, "Confirmation does not match, not running cleanup.").await;
        }
        Confirmation::TimedOut => {
            return reply(ctx, msg, "Confirmation timed out, not running cleanup.").await;
        }
    }

    let typing = msg.channel_id.start_typing(&ctx.http);
    let count = classes.len();
    let teardowns = classes.iter().map(|(role_id, record)| async move {
        match record {
            Some(record) => teardown_class(bot, ctx, guild_id, *role_id, record).await,
            None => teardown_stale(bot, ctx, guild_id, *role_id).await,
        }
    });
    let failures: Vec<String> = join_all(teardowns).await.into_iter().flatten().collect();
    typing.stop();

    let done = format!("Cleanup complete. Removed {count} classes.");
    send_chunked(ctx, msg, teardown_summary(&done, failures)).await
}

// ---------------------------------------------------------------------------
// Membership and enumeration
// ---------------------------------------------------------------------------

/// Resolve a student-facing class id like `cs301` to its role id.
async fn resolve_class(bot: &Bot, class_id: &str) -> Result<Option<u64>> {
    let wanted = class_id.trim().to_lowercase();
    for (role_id, record) in bot.store.list_records().await? {
        if let Some(record) = record {
            if record.class_id() == wanted {
                return Ok(Some(role_id));
            }
        }
    }
    Ok(None)
}

async fn join_class(bot: &Bot, ctx: &Context, msg: &Message, args: &str) -> Result<()> {
    let Some(guild_id) = msg.guild_id else {
        return reply(ctx, msg, "That command only works in the server.").await;
    };
    let Some(role_id) = resolve_class(bot, args).await? else {
        return reply(ctx, msg, "Invalid class id").await;
    };
    let member =
        guild_id
            .member(&ctx.http, msg.author.id)
            .await
            .map_err(|source| DiscordError::ApiFailed {
                context: "fetch invoking member".to_string(),
                source,
            })?;
    member
        .add_role(&ctx.http, RoleId::new(role_id))
        .await
        .map_err(|source| DiscordError::ApiFailed {
            context: "add class role".to_string(),
            source,
        })?;
    reply(ctx, msg, "Done").await
}

async fn drop_class(bot: &Bot, ctx: &Context, msg: &Message, args: &str) -> Result<()> {
    let Some(guild_id) = msg.guild_id else {
        return reply(ctx, msg, "That command only works in the server.").await;
    };
    let Some(role_id) = resolve_class(bot, args).await? else {
        return reply(ctx, msg, "Invalid class id").await;
    };
    let member =
        guild_id
            .member(&ctx.http, msg.author.id)
            .await
            .map_err(|source| DiscordError::ApiFailed {
                context: "fetch invoking member".to_string(),
                source,
            })?;
    member
        .remove_role(&ctx.http, RoleId::new(role_id))
        .await
        .map_err(|source| DiscordError::ApiFailed {
            context: "remove class role".to_string(),
            source,
        })?;
    reply(ctx, msg, "Done").await
}

async fn list_classes(bot: &Bot, ctx: &Context, msg: &Message) -> Result<()> {
    let records = bot.store.list_records().await?;
    if records.is_empty() {
        return reply(ctx, msg, "No classes are registered right now.").await;
    }

    let mut lines = vec!["Currently available class channels:".to_string()];
    for (role_id, record) in records {
        match record {
            Some(record) => lines.push(format!(
                "* {}: {} ({})",
                record.class_id(),
                record.title,
                record.instructor
            )),
            None => lines.push(format!("* {role_id} (stale record)")),
        }
    }
    send_chunked(ctx, msg, lines).await
}

async fn sync_channels(bot: &Bot, ctx: &Context, msg: &Message) -> Result<()> {
    if require_moderator(bot, ctx, msg).await?.is_none() {
        return Ok(());
    }

    let typing = msg.channel_id.start_typing(&ctx.http);
    let records = bot.store.list_records().await?;

    let mut stale: Vec<String> = Vec::new();
    let mut tasks = Vec::new();
    for (role_id, record) in &records {
        match record {
            Some(record) => tasks.push(async move {
                let channel = ChannelId::new(record.channel);
                for overwrite in class_overwrites(RoleId::new(*role_id), &bot.config) {
                    if let Err(e) = channel.create_permission(&ctx.http, overwrite).await {
                        warn!(class = role_id, "Sync failed: {e}");
                        return Some(format!("{}: {e}", record.class_id()));
                    }
                }
                None
            }),
            None => stale.push(format!("{role_id}: record missing, skipped")),
        }
    }
    let failures: Vec<String> = join_all(tasks).await.into_iter().flatten().collect();
    typing.stop();

    let mut lines = vec!["Done".to_string()];
    if !stale.is_empty() || !failures.is_empty() {
        lines[0] = "Done, with problems:".to_string();
        lines.extend(stale);
        lines.extend(failures);
    }
    send_chunked(ctx, msg, lines).await
}

async fn register_subject(bot: &Bot, ctx: &Context, msg: &Message, args: &str) -> Result<()> {
    let Some(guild_id) = require_moderator(bot, ctx, msg).await? else {
        return Ok(());
    };

    let code = args.trim();
    if code.is_empty() {
        return reply(ctx, msg, "Please provide a subject code.").await;
    }

    let role = guild_id
        .create_role(
            &ctx.http,
            EditRole::new().name(code).permissions(Permissions::empty()),
        )
        .await
        .map_err(|source| DiscordError::ApiFailed {
            context: "create subject role".to_string(),
            source,
        })?;
    bot.store.add_subject(role.id.get(), code).await?;

    reply(
        ctx,
        msg,
        format!("Successfully created subject role {}.", role.mention()),
    )
    .await
}

// ---------------------------------------------------------------------------
// Novelty commands
// ---------------------------------------------------------------------------

async fn roll(bot: &Bot, ctx: &Context, msg: &Message, args: &str) -> Result<()> {
    match args.trim().parse::<u32>() {
        Ok(highest) if highest >= 1 => {
            let rolled = rand::thread_rng().gen_range(1..=highest);
            reply(ctx, msg, rolled.to_string()).await
        }
        _ => {
            reply(
                ctx,
                msg,
                format!("Proper usage is {}roll 20", bot.config.discord.prefix),
            )
            .await
        }
    }
}

async fn cat(bot: &Bot, ctx: &Context, msg: &Message) -> Result<()> {
    let url = bot.content.random_cat().await?;
    msg.channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(CreateEmbed::new().image(url)),
        )
        .await
        .map_err(|source| DiscordError::ApiFailed {
            context: "send cat embed".to_string(),
            source,
        })?;
    Ok(())
}

async fn hotdog(ctx: &Context, msg: &Message) -> Result<()> {
    msg.channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(CreateEmbed::new().image(HOTDOG_URL)),
        )
        .await
        .map_err(|source| DiscordError::ApiFailed {
            context: "send hotdog embed".to_string(),
            source,
        })?;
    Ok(())
}

async fn insult(bot: &Bot, ctx: &Context, msg: &Message, args: &str) -> Result<()> {
    let insult = bot.content.insult().await?;
    let target = match args.trim() {
        "" => msg.author.mention().to_string(),
        target => target.to_string(),
    };
    reply(ctx, msg, format!("{target} {insult}")).await
}

async fn source(ctx: &Context, msg: &Message) -> Result<()> {
    reply(ctx, msg, SOURCE_URL).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_role_ref() {
        assert_eq!(parse_role_ref("123456"), Some(123456));
        assert_eq!(parse_role_ref(" 123456 "), Some(123456));
        assert_eq!(parse_role_ref("<@&123456>"), Some(123456));
        assert_eq!(parse_role_ref("cs301"), None);
        assert_eq!(parse_role_ref(""), None);
    }

    #[test]
    fn test_chunk_lines_respects_budget() {
        let lines: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        let chunks = chunk_lines(lines.clone(), 100);
        assert!(chunks.iter().all(|c| c.len() <= 100));
        let rejoined: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.lines().map(str::to_string))
            .collect();
        assert_eq!(rejoined, lines);
    }

    #[test]
    fn test_chunk_lines_single_small_message() {
        let chunks = chunk_lines(vec!["a".to_string(), "b".to_string()], 2000);
        assert_eq!(chunks, vec!["a\nb".to_string()]);
    }

    #[test]
    fn test_chunk_lines_hard_splits_overlong_line() {
        let long = "x".repeat(450);
        let chunks = chunk_lines(vec![long], 200);
        assert!(chunks.iter().all(|c| c.len() <= 200));
        assert_eq!(chunks.concat().len(), 450);
    }

    #[test]
    fn test_merge_confirmation_format() {
        let from = ClassRecord {
            channel: 1,
            subject: "CS".to_string(),
            course: "201".to_string(),
            title: "Intro".to_string(),
            instructor: "Dr. A".to_string(),
            section: Some("F01".to_string()),
        };
        let to = ClassRecord {
            channel: 2,
            subject: "CS".to_string(),
            course: "202".to_string(),
            title: "Intro II".to_string(),
            instructor: "Dr. B".to_string(),
            section: None,
        };
        assert_eq!(merge_confirmation(&from, &to), "CS-201-F01>CS-202");
    }

    #[test]
    fn test_teardown_summary_reports_failures() {
        let clean = teardown_summary("Class deleted.", vec![]);
        assert_eq!(clean, vec!["Class deleted.".to_string()]);

        let broken = teardown_summary(
            "Class deleted.",
            vec!["cs301: role deletion failed: boom".to_string()],
        );
        assert_eq!(broken.len(), 2);
        assert!(broken[0].contains("Some steps failed"));
        assert!(broken[1].starts_with("* cs301"));
    }
}
