use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Schools (natural 8-digit ids, assigned by the caller)
        manager
            .create_table(
                Table::create()
                    .table(Schools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schools::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schools::Name).string())
                    .col(
                        ColumnDef::new(Schools::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Classrooms
        manager
            .create_table(
                Table::create()
                    .table(Classrooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Classrooms::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Classrooms::SchoolId).integer().not_null())
                    .col(ColumnDef::new(Classrooms::ClassIndex).string().not_null())
                    .col(
                        ColumnDef::new(Classrooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-classroom-school_id")
                            .from(Classrooms::Table, Classrooms::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Students
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::ClassId).integer().not_null())
                    .col(ColumnDef::new(Students::FullName).string())
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student-class_id")
                            .from(Students::Table, Students::ClassId)
                            .to(Classrooms::Table, Classrooms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Lesson Reports
        manager
            .create_table(
                Table::create()
                    .table(LessonReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LessonReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LessonReports::SchoolId).integer().not_null())
                    .col(ColumnDef::new(LessonReports::ClassId).integer().not_null())
                    .col(
                        ColumnDef::new(LessonReports::ClassIndex)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LessonReports::LessonDate).date().not_null())
                    .col(ColumnDef::new(LessonReports::LessonTime).time().not_null())
                    .col(
                        ColumnDef::new(LessonReports::StudentsCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LessonReports::AvgAttention)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(LessonReports::AvgInattention)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(LessonReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-report-school_id")
                            .from(LessonReports::Table, LessonReports::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-report-class_id")
                            .from(LessonReports::Table, LessonReports::ClassId)
                            .to(Classrooms::Table, Classrooms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Attention Entries
        manager
            .create_table(
                Table::create()
                    .table(AttentionEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttentionEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttentionEntries::ReportId).uuid().not_null())
                    .col(
                        ColumnDef::new(AttentionEntries::StudentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttentionEntries::Attention)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttentionEntries::Inattention)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttentionEntries::ImagePath).string())
                    .col(
                        ColumnDef::new(AttentionEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attention_entry-report_id")
                            .from(AttentionEntries::Table, AttentionEntries::ReportId)
                            .to(LessonReports::Table, LessonReports::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attention_entry-student_id")
                            .from(AttentionEntries::Table, AttentionEntries::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Unrecognized Entries
        manager
            .create_table(
                Table::create()
                    .table(UnrecognizedEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UnrecognizedEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UnrecognizedEntries::ReportId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnrecognizedEntries::Attention)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnrecognizedEntries::Inattention)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UnrecognizedEntries::ImagePath).string())
                    .col(
                        ColumnDef::new(UnrecognizedEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-unrecognized_entry-report_id")
                            .from(UnrecognizedEntries::Table, UnrecognizedEntries::ReportId)
                            .to(LessonReports::Table, LessonReports::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UnrecognizedEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttentionEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LessonReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classrooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schools::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Schools {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Classrooms {
    Table,
    Id,
    SchoolId,
    ClassIndex,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    ClassId,
    FullName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LessonReports {
    Table,
    Id,
    SchoolId,
    ClassId,
    ClassIndex,
    LessonDate,
    LessonTime,
    StudentsCount,
    AvgAttention,
    AvgInattention,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AttentionEntries {
    Table,
    Id,
    ReportId,
    StudentId,
    Attention,
    Inattention,
    ImagePath,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UnrecognizedEntries {
    Table,
    Id,
    ReportId,
    Attention,
    Inattention,
    ImagePath,
    CreatedAt,
}
