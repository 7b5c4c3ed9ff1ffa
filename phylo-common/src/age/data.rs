//! Bundled geological time table (Phanerozoic)
//!
//! Listed youngest first; ids are assigned in this order, so id 1 is the
//! youngest age.

use super::{EpochDef, EraDef, PeriodDef};

pub(super) const ERAS: &[EraDef] = &[
    EraDef {
        name: "新生代",
        periods: &[
            PeriodDef {
                name: "第四紀",
                epochs: &[
                    EpochDef {
                        name: "完新世",
                        ages: &["メガラヤン", "ノースグリッピアン", "グリーンランディアン"],
                    },
                    EpochDef {
                        name: "更新世",
                        ages: &["後期更新世", "チバニアン", "カラブリアン", "ジェラシアン"],
                    },
                ],
            },
            PeriodDef {
                name: "新第三紀",
                epochs: &[
                    EpochDef {
                        name: "鮮新世",
                        ages: &["ピアセンジアン", "ザンクリアン"],
                    },
                    EpochDef {
                        name: "中新世",
                        ages: &[
                            "メッシニアン",
                            "トートニアン",
                            "サーラバリアン",
                            "ランギアン",
                            "バーディガリアン",
                            "アキタニアン",
                        ],
                    },
                ],
            },
            PeriodDef {
                name: "古第三紀",
                epochs: &[
                    EpochDef {
                        name: "漸新世",
                        ages: &["チャッティアン", "ルペリアン"],
                    },
                    EpochDef {
                        name: "始新世",
                        ages: &["プリアボニアン", "バートニアン", "ルテシアン", "ヤプレシアン"],
                    },
                    EpochDef {
                        name: "暁新世",
                        ages: &["サネティアン", "セランディアン", "ダニアン"],
                    },
                ],
            },
        ],
    },
    EraDef {
        name: "中生代",
        periods: &[
            PeriodDef {
                name: "白亜紀",
                epochs: &[
                    EpochDef {
                        name: "後期白亜紀",
                        ages: &[
                            "マーストリヒチアン",
                            "カンパニアン",
                            "サントニアン",
                            "コニアシアン",
                            "チューロニアン",
                            "セノマニアン",
                        ],
                    },
                    EpochDef {
                        name: "前期白亜紀",
                        ages: &[
                            "アルビアン",
                            "アプチアン",
                            "バレミアン",
                            "オーテリビアン",
                            "バランギニアン",
                            "ベリアシアン",
                        ],
                    },
                ],
            },
            PeriodDef {
                name: "ジュラ紀",
                epochs: &[
                    EpochDef {
                        name: "後期ジュラ紀",
                        ages: &["ティトニアン", "キンメリッジアン", "オックスフォーディアン"],
                    },
                    EpochDef {
                        name: "中期ジュラ紀",
                        ages: &["カロビアン", "バトニアン", "バッジョシアン", "アーレニアン"],
                    },
                    EpochDef {
                        name: "前期ジュラ紀",
                        ages: &["トアルシアン", "プリンスバッキアン", "シネムーリアン", "ヘッタンギアン"],
                    },
                ],
            },
            PeriodDef {
                name: "三畳紀",
                epochs: &[
                    EpochDef {
                        name: "後期三畳紀",
                        ages: &["レーティアン", "ノーリアン", "カーニアン"],
                    },
                    EpochDef {
                        name: "中期三畳紀",
                        ages: &["ラディニアン", "アニシアン"],
                    },
                    EpochDef {
                        name: "前期三畳紀",
                        ages: &["オレネキアン", "インドゥアン"],
                    },
                ],
            },
        ],
    },
    EraDef {
        name: "古生代",
        periods: &[
            PeriodDef {
                name: "ペルム紀",
                epochs: &[
                    EpochDef {
                        name: "ローピンジアン",
                        ages: &["チャンシンジアン", "ウーチャーピンジアン"],
                    },
                    EpochDef {
                        name: "グアダルピアン",
                        ages: &["キャピタニアン", "ウォーディアン", "ローディアン"],
                    },
                    EpochDef {
                        name: "シスウラリアン",
                        ages: &["クングーリアン", "アーティンスキアン", "サクマーリアン", "アッセリアン"],
                    },
                ],
            },
            PeriodDef {
                name: "石炭紀",
                epochs: &[
                    EpochDef {
                        name: "ペンシルバニアン",
                        ages: &["グゼリアン", "カシモビアン", "モスコビアン", "バシキーリアン"],
                    },
                    EpochDef {
                        name: "ミシシッピアン",
                        ages: &["サープコビアン", "ビゼーアン", "トルネーシアン"],
                    },
                ],
            },
            PeriodDef {
                name: "デボン紀",
                epochs: &[
                    EpochDef {
                        name: "後期デボン紀",
                        ages: &["ファメニアン", "フラニアン"],
                    },
                    EpochDef {
                        name: "中期デボン紀",
                        ages: &["ジベティアン", "アイフェリアン"],
                    },
                    EpochDef {
                        name: "前期デボン紀",
                        ages: &["エムシアン", "プラギアン", "ロッコヴィアン"],
                    },
                ],
            },
            PeriodDef {
                name: "シルル紀",
                epochs: &[
                    EpochDef {
                        name: "プリドリ",
                        ages: &["プリドリ"],
                    },
                    EpochDef {
                        name: "ラドロー",
                        ages: &["ルドフォーディアン", "ゴースティアン"],
                    },
                    EpochDef {
                        name: "ウェンロック",
                        ages: &["ホメリアン", "シェインウッディアン"],
                    },
                    EpochDef {
                        name: "ランドベリ",
                        ages: &["テリチアン", "アエロニアン", "ラッダニアン"],
                    },
                ],
            },
            PeriodDef {
                name: "オルドビス紀",
                epochs: &[
                    EpochDef {
                        name: "後期オルドビス紀",
                        ages: &["ヒルナンシアン", "カティアン", "サンドビアン"],
                    },
                    EpochDef {
                        name: "中期オルドビス紀",
                        ages: &["ダーリウィリアン", "ダーピンジアン"],
                    },
                    EpochDef {
                        name: "前期オルドビス紀",
                        ages: &["フロイアン", "トレマドキアン"],
                    },
                ],
            },
            PeriodDef {
                name: "カンブリア紀",
                epochs: &[
                    EpochDef {
                        name: "フロンギアン",
                        ages: &["ステージ10", "ジャンシャニアン", "パイビアン"],
                    },
                    EpochDef {
                        name: "ミャオリンギアン",
                        ages: &["グズハンギアン", "ドラミアン", "ウリューアン"],
                    },
                    EpochDef {
                        name: "第2統",
                        ages: &["ステージ4", "ステージ3"],
                    },
                    EpochDef {
                        name: "テレニュービアン",
                        ages: &["ステージ2", "フォーチュニアン"],
                    },
                ],
            },
        ],
    },
];
