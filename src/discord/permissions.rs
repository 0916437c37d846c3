use crate::config::Config;
use serenity::model::channel::{PermissionOverwrite, PermissionOverwriteType};
use serenity::model::id::RoleId;
use serenity::model::permissions::Permissions;

/// Elevated access granted to staff in class channels.
fn staff_allow() -> Permissions {
    Permissions::MENTION_EVERYONE | Permissions::MANAGE_MESSAGES
}

/// Derive the full overwrite set for one class channel.
///
/// Recomputed from scratch on every call: the set is a pure function of the
/// class role and the configured staff roles, so re-applying it (creation or
/// `sync`) always converges to the same permissions.
pub fn class_overwrites(class_role: RoleId, config: &Config) -> Vec<PermissionOverwrite> {
    vec![
        // @everyone (the role sharing the guild id): hide the channel.
        PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(RoleId::new(config.discord.guild_id)),
        },
        PermissionOverwrite {
            allow: staff_allow(),
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(RoleId::new(config.roles.teacher)),
        },
        PermissionOverwrite {
            allow: staff_allow(),
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(RoleId::new(config.roles.teaching_assistant)),
        },
        PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(class_role),
        },
        PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(RoleId::new(config.roles.admin_utility)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> Config {
        let mut config = Config::default();
        config.discord.guild_id = 100;
        config.roles.teacher = 200;
        config.roles.teaching_assistant = 300;
        config.roles.admin = 400;
        config.roles.admin_utility = 500;
        config
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let config = config();
        let first = class_overwrites(RoleId::new(900), &config);
        let second = class_overwrites(RoleId::new(900), &config);
        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }

    #[test]
    fn test_everyone_is_denied_read() {
        let config = config();
        let overwrites = class_overwrites(RoleId::new(900), &config);
        let everyone = &overwrites[0];
        assert_eq!(everyone.deny, Permissions::VIEW_CHANNEL);
        assert_eq!(everyone.allow, Permissions::empty());
        assert!(matches!(
            everyone.kind,
            PermissionOverwriteType::Role(id) if id.get() == 100
        ));
    }

    #[test]
    fn test_class_role_is_granted_read_only() {
        let config = config();
        let overwrites = class_overwrites(RoleId::new(900), &config);
        let class = overwrites
            .iter()
            .find(|ow| matches!(ow.kind, PermissionOverwriteType::Role(id) if id.get() == 900))
            .unwrap();
        assert_eq!(class.allow, Permissions::VIEW_CHANNEL);
        assert_eq!(class.deny, Permissions::empty());
    }

    #[test]
    fn test_staff_roles_get_elevated_access() {
        let config = config();
        let overwrites = class_overwrites(RoleId::new(900), &config);
        for staff_id in [200u64, 300] {
            let staff = overwrites
                .iter()
                .find(
                    |ow| matches!(ow.kind, PermissionOverwriteType::Role(id) if id.get() == staff_id),
                )
                .unwrap();
            assert_eq!(
                staff.allow,
                Permissions::MENTION_EVERYONE | Permissions::MANAGE_MESSAGES
            );
            assert_eq!(staff.deny, Permissions::empty());
        }
    }
}
