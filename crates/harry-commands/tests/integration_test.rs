//! Integration tests for command wiring and shared state.

use harry_commands::admin::ai_usage_fields;
use harry_commands::{framework_options, AdminManager, ChannelManager, Data};
use harry_common::test_utils::discord_fixtures::{test_admin_id, test_channel_id, test_guild_id, test_user_id};
use harry_common::test_utils::init_test_logging;
use harry_config::Config;
use harry_fun::{Authorizer, Caller, MemberInfo};

fn caller(user_id: harry_common::UserId, guild_administrator: bool) -> Caller {
    Caller {
        user_id,
        display_name: "Caller".to_string(),
        guild_administrator,
    }
}

#[test]
fn test_data_builds_from_default_config() {
    init_test_logging();
    let data = Data::new(Config::default()).expect("default config builds");

    assert!(!data.tracker.ai_enabled());
    assert_eq!(data.admins.admin_count(), 0);
    assert_eq!(data.channels.blocked_count(), 0);
    assert!(!data.reporter.is_enabled());
}

#[test]
fn test_command_tree() {
    let options = framework_options();
    let names: Vec<&str> = options.commands.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["fun", "admin"]);

    let fun = &options.commands[0];
    let mut subcommands: Vec<&str> = fun.subcommands.iter().map(|c| c.name.as_str()).collect();
    subcommands.sort_unstable();
    assert_eq!(
        subcommands,
        vec!["status", "target", "target_all", "timeout", "toggle_engage", "untarget", "untarget_all"]
    );

    let admin = &options.commands[1];
    let mut subcommands: Vec<&str> = admin.subcommands.iter().map(|c| c.name.as_str()).collect();
    subcommands.sort_unstable();
    assert_eq!(
        subcommands,
        vec!["add", "ai", "block", "blocked", "budget", "list", "metrics", "remove", "unblock"]
    );
}

#[test]
fn test_configured_admins_can_manage_targets() {
    let mut config = Config::default();
    config.discord.admin_ids = vec![test_admin_id().get()];
    let data = Data::new(config).expect("config builds");

    let member = MemberInfo {
        user_id: test_user_id(),
        display_name: "Target".to_string(),
        bot: false,
    };
    let target = data
        .tracker
        .add_target(&caller(test_admin_id(), false), test_guild_id(), &member, 30, false)
        .expect("configured admin may add targets");
    assert_eq!(target.timeout_minutes, 30);

    let refused = data
        .tracker
        .add_target(&caller(test_user_id(), false), test_guild_id(), &member, 30, false);
    assert!(refused.is_err());
}

#[test]
fn test_runtime_admins_share_the_tracker_authorizer() {
    let data = Data::new(Config::default()).expect("default config builds");
    let promoted = caller(test_user_id(), false);

    assert!(data.tracker.list_targets(&promoted, test_guild_id()).is_err());
    assert!(data.admins.add_admin(test_user_id()));
    assert!(data.tracker.list_targets(&promoted, test_guild_id()).is_ok());
}

#[test]
fn test_guild_administrators_are_always_admins() {
    let admins = AdminManager::default();
    assert!(admins.is_admin(&caller(test_user_id(), true), test_guild_id()));
    assert!(!admins.is_admin(&caller(test_user_id(), false), test_guild_id()));
}

#[test]
fn test_channel_block_list() {
    let channels = ChannelManager::new();
    assert!(!channels.is_blocked(test_channel_id()));
    channels.block_channel(test_channel_id());
    assert!(channels.is_blocked(test_channel_id()));
    assert_eq!(channels.blocked_channels(), vec![test_channel_id()]);
}

#[tokio::test]
async fn test_ai_usage_report_reflects_recorded_usage() {
    let data = Data::new(Config::default()).expect("default config builds");
    data.costs.record_ai_usage(1_500, 500).await;
    data.costs.record_ai_usage(200, 100).await;

    let status = data.costs.budget_status().await;
    let fields = ai_usage_fields(&status);
    assert_eq!(fields[0].1, "**2** queries");
    assert_eq!(fields[1].1, "**2,300** tokens");
}

#[test]
fn test_dedup_rejects_repeated_interactions() {
    let data = Data::new(Config::default()).expect("default config builds");
    assert!(data.dedup.check_and_record(42));
    assert!(!data.dedup.check_and_record(42));
    assert!(data.dedup.check_and_record(43));
}
