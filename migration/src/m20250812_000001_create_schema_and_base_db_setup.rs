use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the service's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS social_login;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO social_login, public;")
            .await?;

        // Create the base DB user that will execute all service queries
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE social_login TO social_login;
                    GRANT ALL ON SCHEMA social_login TO social_login;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA social_login GRANT ALL ON TABLES TO social_login;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA social_login GRANT ALL ON SEQUENCES TO social_login;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA social_login GRANT ALL ON FUNCTIONS TO social_login;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA social_login REVOKE ALL ON FUNCTIONS FROM social_login;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA social_login REVOKE ALL ON SEQUENCES FROM social_login;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA social_login REVOKE ALL ON TABLES FROM social_login;
                    REVOKE ALL ON SCHEMA social_login FROM social_login;
                    REVOKE ALL PRIVILEGES ON DATABASE social_login FROM social_login;
                END $$;
            "#)
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS social_login CASCADE;")
            .await?;

        Ok(())
    }
}
